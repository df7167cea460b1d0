// Advances one emitter's particles by a time increment: expiry, Euler
// integration with noise jitter, opacity, then the boundary policy.

use crate::config::{BoundaryPolicy, EmitterConfig, OpacityPolicy};
use crate::noise::NoiseField;
use crate::particle::Particle;
use crate::store::ParticleStore;
use crate::Bounds;
use vecmath::{vec2_add, vec2_scale};

#[derive(Debug, Clone, Default)]
pub struct Stepper {
    noise: NoiseField,
    // Seconds of simulated time, drives the noise and the opacity pulse
    clock: f64,
}

impl Stepper {
    // Noise time units per simulated second
    const NOISE_RATE: f64 = 0.6;

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn reset(&mut self) {
        self.clock = 0.0;
    }

    // Advances every particle by `dt` seconds at frame time `now` (ms).
    // Returns how many particles were removed.
    pub fn step(
        &mut self,
        store: &mut ParticleStore,
        config: &EmitterConfig,
        dt: f64,
        now: f64,
        bounds: Bounds,
    ) -> usize {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt;
        let clock = self.clock;
        let noise = self.noise;
        let noise_time = clock * Stepper::NOISE_RATE;
        let before = store.len();

        store.retain_mut(|p| {
            if p.is_expired(now) {
                return false;
            }
            let mut vel = p.vel;
            if config.noise_strength > 0.0 {
                let drift = noise.drift(p.pos, noise_time);
                vel = vec2_add(vel, vec2_scale(drift, config.noise_strength));
            }
            p.pos = vec2_add(p.pos, vec2_scale(vel, dt));
            p.opacity = opacity(config.opacity_policy, p, clock, now);
            p.size = p.size.max(Particle::MIN_SIZE);
            keep_in_bounds(config.boundary, p, bounds)
        });

        before - store.len()
    }
}

fn opacity(policy: OpacityPolicy, p: &Particle, clock: f64, now: f64) -> f64 {
    let value = match policy {
        OpacityPolicy::Constant => p.base_opacity,
        OpacityPolicy::Pulse { amplitude, rate } => {
            p.base_opacity + (clock * rate + p.phase).sin() * amplitude
        }
        OpacityPolicy::LinearDecay => p.base_opacity * p.remaining(now),
        OpacityPolicy::FadeInOut { edge } => {
            if p.lifetime.is_none() || edge <= 0.0 {
                p.base_opacity
            } else {
                let remaining = p.remaining(now);
                let progress = 1.0 - remaining;
                let ramp = (progress / edge).min(remaining / edge).min(1.0);
                p.base_opacity * ramp
            }
        }
    };
    if value.is_finite() {
        value.max(0.0).min(1.0)
    } else {
        0.0
    }
}

// Returns false when the particle has to go
fn keep_in_bounds(policy: BoundaryPolicy, p: &mut Particle, bounds: Bounds) -> bool {
    match policy {
        BoundaryPolicy::Wrap { margin } => {
            p.pos[0] = wrap(p.pos[0], bounds.width, margin);
            p.pos[1] = wrap(p.pos[1], bounds.height, margin);
            true
        }
        BoundaryPolicy::Cull { margin } => {
            let [x, y] = p.pos;
            x >= -margin
                && x <= bounds.width + margin
                && y >= -margin
                && y <= bounds.height + margin
        }
    }
}

fn wrap(value: f64, extent: f64, margin: f64) -> f64 {
    if value < -margin {
        extent + margin
    } else if value > extent + margin {
        -margin
    } else {
        value
    }
}
