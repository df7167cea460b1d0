// Per-effect configuration. An effect is one or more emitters sharing a canvas,
// every emitter owns its own population and behaviour.
// Distances are pixels, velocities pixels per second, times milliseconds.

use crate::color::{Color, Palette};
use crate::particle::Particle;
use crate::random::RandomSource;
use std::f64::consts::PI;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Span {
        Span { min, max }
    }

    pub const fn fixed(value: f64) -> Span {
        Span {
            min: value,
            max: value,
        }
    }

    // Uniform in [min, max), a reversed span is sampled as if it were ordered
    pub fn sample(&self, rng: &mut dyn RandomSource) -> f64 {
        let (lo, hi) = self.ordered();
        rng.range(lo, hi)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let (lo, hi) = self.ordered();
        value.max(lo).min(hi)
    }

    fn ordered(&self) -> (f64, f64) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CapPolicy {
    EvictOldest,
    Reject,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BoundaryPolicy {
    // Leaving by more than `margin` re-enters at the opposite edge
    Wrap { margin: f64 },
    // Leaving by more than `margin` removes the particle
    Cull { margin: f64 },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OpacityPolicy {
    Constant,
    // base + sin(seconds * rate + phase) * amplitude
    Pulse { amplitude: f64, rate: f64 },
    // base * remaining lifetime fraction
    LinearDecay,
    // Ramps up over the first `edge` fraction of the lifetime, down over the last
    FadeInOut { edge: f64 },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SpawnPolicy {
    // `count` particles when the effect starts and again after every resize
    Burst { count: Span },
    // One particle every `delay_ms`, the first after `first_delay_ms` if set
    Interval {
        delay_ms: Span,
        first_delay_ms: Option<f64>,
    },
    // One particle per pointer move, at most one every `throttle_ms`
    Pointer { throttle_ms: f64 },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SpawnOrigin {
    Anywhere,
    NearPointer { spread: f64 },
    // Just past the top edge or a side edge, heading diagonally inward
    ScreenEdge { overshoot: f64 },
    // Fractions of the surface size, with a fixed heading in radians
    Band { x: Span, y: Span, heading: f64 },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Motion {
    Drift { vx: Span, vy: Span },
    // Velocity along the heading picked by the origin
    Heading { speed: Span },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Dust,
    Spark,
    Streak { length: Span },
    Twinkle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmitterConfig {
    pub name: &'static str,
    pub shape: Shape,
    pub cap: usize,
    pub cap_policy: CapPolicy,
    pub lifetime_ms: Option<f64>,
    pub size: Span,
    pub opacity: Span,
    pub spawn: SpawnPolicy,
    pub origin: SpawnOrigin,
    pub motion: Motion,
    // Peak noise jitter in pixels per second, 0 disables it
    pub noise_strength: f64,
    pub opacity_policy: OpacityPolicy,
    pub boundary: BoundaryPolicy,
    pub palette: Palette,
}

impl EmitterConfig {
    pub fn cosmic_dust() -> EmitterConfig {
        EmitterConfig {
            name: "cosmic-dust",
            shape: Shape::Dust,
            cap: 60,
            cap_policy: CapPolicy::Reject,
            lifetime_ms: None,
            size: Span::new(1.0, 3.0),
            opacity: Span::new(0.1, 0.5),
            spawn: SpawnPolicy::Burst {
                count: Span::new(40.0, 60.0),
            },
            origin: SpawnOrigin::Anywhere,
            motion: Motion::Drift {
                vx: Span::new(-6.0, 6.0),
                vy: Span::new(-6.0, 6.0),
            },
            noise_strength: 6.0,
            opacity_policy: OpacityPolicy::Pulse {
                amplitude: 0.1,
                rate: 0.6,
            },
            boundary: BoundaryPolicy::Wrap { margin: 10.0 },
            palette: Palette::dust(),
        }
    }

    pub fn cursor_trail() -> EmitterConfig {
        EmitterConfig {
            name: "cursor-trail",
            shape: Shape::Spark,
            cap: 50,
            cap_policy: CapPolicy::EvictOldest,
            lifetime_ms: Some(800.0),
            size: Span::new(2.0, 4.0),
            opacity: Span::fixed(1.0),
            spawn: SpawnPolicy::Pointer { throttle_ms: 30.0 },
            origin: SpawnOrigin::NearPointer { spread: 20.0 },
            motion: Motion::Drift {
                vx: Span::new(-15.0, 15.0),
                vy: Span::new(-42.0, -12.0),
            },
            noise_strength: 0.0,
            opacity_policy: OpacityPolicy::LinearDecay,
            boundary: BoundaryPolicy::Cull { margin: 50.0 },
            palette: Palette::trail(),
        }
    }

    pub fn shooting_star() -> EmitterConfig {
        EmitterConfig {
            name: "shooting-star",
            shape: Shape::Streak {
                length: Span::new(60.0, 140.0),
            },
            cap: 1,
            cap_policy: CapPolicy::EvictOldest,
            lifetime_ms: None,
            size: Span::fixed(3.0),
            opacity: Span::fixed(1.0),
            spawn: SpawnPolicy::Interval {
                delay_ms: Span::new(12_000.0, 18_000.0),
                first_delay_ms: None,
            },
            origin: SpawnOrigin::ScreenEdge { overshoot: 50.0 },
            motion: Motion::Heading {
                speed: Span::new(360.0, 600.0),
            },
            noise_strength: 0.0,
            opacity_policy: OpacityPolicy::Constant,
            boundary: BoundaryPolicy::Cull { margin: 200.0 },
            palette: Palette::shooting_star(),
        }
    }

    pub fn meteor() -> EmitterConfig {
        EmitterConfig {
            name: "meteor",
            shape: Shape::Streak {
                length: Span::fixed(48.0),
            },
            cap: 8,
            cap_policy: CapPolicy::EvictOldest,
            lifetime_ms: Some(3000.0),
            size: Span::fixed(2.0),
            opacity: Span::fixed(1.0),
            spawn: SpawnPolicy::Interval {
                delay_ms: Span::new(8000.0, 15_000.0),
                first_delay_ms: Some(2000.0),
            },
            origin: SpawnOrigin::Band {
                x: Span::new(0.7, 1.0),
                y: Span::new(0.0, 0.5),
                heading: 0.75 * PI,
            },
            motion: Motion::Heading {
                speed: Span::fixed(100.0 * 2f64.sqrt()),
            },
            noise_strength: 0.0,
            opacity_policy: OpacityPolicy::FadeInOut { edge: 0.1 },
            boundary: BoundaryPolicy::Cull { margin: 200.0 },
            palette: Palette::meteor(),
        }
    }

    pub fn starfield() -> EmitterConfig {
        EmitterConfig {
            name: "starfield",
            shape: Shape::Twinkle,
            cap: 200,
            cap_policy: CapPolicy::Reject,
            lifetime_ms: None,
            size: Span::new(2.0, 5.0),
            opacity: Span::fixed(0.3),
            spawn: SpawnPolicy::Burst {
                count: Span::fixed(200.0),
            },
            origin: SpawnOrigin::Anywhere,
            motion: Motion::Drift {
                vx: Span::fixed(0.0),
                vy: Span::fixed(0.0),
            },
            noise_strength: 0.0,
            opacity_policy: OpacityPolicy::Pulse {
                amplitude: 0.1,
                rate: PI,
            },
            boundary: BoundaryPolicy::Wrap { margin: 0.0 },
            palette: Palette::starfield(),
        }
    }

    pub fn with_cap(mut self, cap: usize) -> EmitterConfig {
        self.cap = cap;
        if let SpawnPolicy::Burst { count } = self.spawn {
            let cap = cap as f64;
            self.spawn = SpawnPolicy::Burst {
                count: Span::new(count.min.min(cap), count.max.min(cap)),
            };
        }
        self
    }

    pub fn with_lifetime_ms(mut self, lifetime_ms: Option<f64>) -> EmitterConfig {
        self.lifetime_ms = lifetime_ms.map(|l| l.max(0.0));
        self
    }

    pub fn with_size(mut self, min: f64, max: f64) -> EmitterConfig {
        self.size = Span::new(min.max(Particle::MIN_SIZE), max.max(Particle::MIN_SIZE));
        self
    }

    pub fn with_opacity(mut self, min: f64, max: f64) -> EmitterConfig {
        let unit = Span::new(0.0, 1.0);
        self.opacity = Span::new(unit.clamp(min), unit.clamp(max));
        self
    }

    // Only meaningful for interval emitters, others are left alone
    pub fn with_spawn_interval_ms(mut self, min: f64, max: f64) -> EmitterConfig {
        if let SpawnPolicy::Interval { first_delay_ms, .. } = self.spawn {
            self.spawn = SpawnPolicy::Interval {
                delay_ms: Span::new(min.max(0.0), max.max(0.0)),
                first_delay_ms,
            };
        }
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerGlow {
    pub radius: f64,
    pub color: Color,
    pub intensity: f64,
}

impl Default for PointerGlow {
    fn default() -> Self {
        PointerGlow {
            radius: 400.0,
            color: Color::WHITE,
            intensity: 0.08,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectConfig {
    pub emitters: Vec<EmitterConfig>,
    pub pointer_glow: Option<PointerGlow>,
}

impl EffectConfig {
    pub fn single(emitter: EmitterConfig) -> EffectConfig {
        EffectConfig {
            emitters: vec![emitter],
            pointer_glow: None,
        }
    }

    pub fn cosmic_dust() -> EffectConfig {
        EffectConfig::single(EmitterConfig::cosmic_dust())
    }

    pub fn cursor_trail() -> EffectConfig {
        EffectConfig::single(EmitterConfig::cursor_trail())
    }

    pub fn shooting_star() -> EffectConfig {
        EffectConfig::single(EmitterConfig::shooting_star())
    }

    pub fn space_background() -> EffectConfig {
        EffectConfig {
            emitters: vec![EmitterConfig::starfield(), EmitterConfig::meteor()],
            pointer_glow: Some(PointerGlow::default()),
        }
    }

    pub fn preset(name: &str) -> Option<EffectConfig> {
        match name {
            "cosmic-dust" => Some(EffectConfig::cosmic_dust()),
            "cursor-trail" => Some(EffectConfig::cursor_trail()),
            "shooting-star" => Some(EffectConfig::shooting_star()),
            "space-background" => Some(EffectConfig::space_background()),
            _ => None,
        }
    }

    // Applies `f` to every emitter
    pub fn map_emitters<F>(mut self, f: F) -> EffectConfig
    where
        F: Fn(EmitterConfig) -> EmitterConfig,
    {
        self.emitters = self.emitters.into_iter().map(f).collect();
        self
    }
}
