// Creates particles for one emitter. Every call makes at most one particle,
// bursts are just repeated calls.

use crate::config::{EmitterConfig, Motion, Shape, SpawnOrigin, SpawnPolicy};
use crate::particle::{Particle, ParticleKind};
use crate::random::RandomSource;
use crate::store::ParticleStore;
use crate::Bounds;
use std::f64::consts::PI;
use vecmath::Vector2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SpawnTrigger {
    // Startup or resize burst
    Init,
    // Interval timer fired
    Timer,
    // Pointer moved to this surface position
    Pointer { x: f64, y: f64 },
}

#[derive(Debug, Default, Clone)]
pub struct Spawner {
    last_pointer_spawn: Option<f64>,
}

impl Spawner {
    pub fn new() -> Spawner {
        Spawner::default()
    }

    // Spawns zero or one particle at time `now` (ms). Returns whether the
    // store accepted a new particle.
    pub fn spawn(
        &mut self,
        trigger: SpawnTrigger,
        now: f64,
        config: &EmitterConfig,
        store: &mut ParticleStore,
        bounds: Bounds,
        rng: &mut dyn RandomSource,
    ) -> bool {
        let pointer = match trigger {
            SpawnTrigger::Pointer { x, y } => {
                if let SpawnPolicy::Pointer { throttle_ms } = config.spawn {
                    if let Some(last) = self.last_pointer_spawn {
                        if now - last < throttle_ms {
                            return false;
                        }
                    }
                }
                Some([x, y])
            }
            _ => None,
        };

        let (pos, heading) = match origin(config.origin, pointer, bounds, rng) {
            Some(placed) => placed,
            None => return false,
        };
        if pointer.is_some() {
            self.last_pointer_spawn = Some(now);
        }

        let vel = match config.motion {
            Motion::Drift { vx, vy } => [vx.sample(rng), vy.sample(rng)],
            Motion::Heading { speed } => {
                let heading = heading.unwrap_or_else(|| rng.range(0.0, 2.0 * PI));
                vecmath::vec2_scale([heading.cos(), heading.sin()], speed.sample(rng))
            }
        };
        let kind = match config.shape {
            Shape::Dust => ParticleKind::Dust,
            Shape::Spark => ParticleKind::Spark,
            Shape::Streak { length } => ParticleKind::Streak {
                length: length.sample(rng).max(0.0),
            },
            Shape::Twinkle => ParticleKind::Twinkle,
        };
        let size = config.size.sample(rng);
        let opacity = config.opacity.sample(rng);
        let particle = Particle::new(pos, vel, size, opacity, now)
            .with_kind(kind)
            .with_lifetime(config.lifetime_ms)
            .with_color(config.palette.pick(rng))
            .with_phase(rng.range(0.0, 2.0 * PI));

        store.insert(particle)
    }

    // Startup burst, returns the number of particles added
    pub fn burst(
        &mut self,
        now: f64,
        config: &EmitterConfig,
        store: &mut ParticleStore,
        bounds: Bounds,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let count = match config.spawn {
            SpawnPolicy::Burst { count } => count.sample(rng).floor().max(0.0) as usize,
            _ => return 0,
        };
        let mut added = 0;
        for _ in 0..count {
            if self.spawn(SpawnTrigger::Init, now, config, store, bounds, rng) {
                added += 1;
            }
        }
        added
    }

    pub fn reset(&mut self) {
        self.last_pointer_spawn = None;
    }
}

// Spawn position and, for origins that pick one, the heading in radians
fn origin(
    origin: SpawnOrigin,
    pointer: Option<Vector2<f64>>,
    bounds: Bounds,
    rng: &mut dyn RandomSource,
) -> Option<(Vector2<f64>, Option<f64>)> {
    match origin {
        SpawnOrigin::Anywhere => {
            let x = rng.range(0.0, bounds.width);
            let y = rng.range(0.0, bounds.height);
            Some(([x, y], None))
        }
        SpawnOrigin::NearPointer { spread } => {
            let [px, py] = pointer?;
            let x = px + rng.range(-0.5, 0.5) * spread;
            let y = py + rng.range(-0.5, 0.5) * spread;
            Some(([x, y], None))
        }
        SpawnOrigin::ScreenEdge { overshoot } => {
            // Half the streaks come from the right heading down-left,
            // the rest from the left heading down-right
            let from_right = rng.chance(0.5);
            let from_top = rng.chance(0.5);
            let dive = PI / 4.0 + PI / 8.0;
            let (pos, heading) = match (from_right, from_top) {
                (true, true) => {
                    let x = rng.range(0.3, 1.0) * bounds.width;
                    ([x, -overshoot], PI - dive)
                }
                (true, false) => {
                    let y = rng.range(0.0, 0.3) * bounds.height;
                    ([bounds.width + overshoot, y], PI - dive)
                }
                (false, true) => {
                    let x = rng.range(0.0, 0.7) * bounds.width;
                    ([x, -overshoot], dive)
                }
                (false, false) => {
                    let y = rng.range(0.0, 0.3) * bounds.height;
                    ([-overshoot, y], dive)
                }
            };
            Some((pos, Some(heading)))
        }
        SpawnOrigin::Band { x, y, heading } => {
            let pos = [x.sample(rng) * bounds.width, y.sample(rng) * bounds.height];
            Some((pos, Some(heading)))
        }
    }
}
