// Simple particle struct to keep track of individual position, velocity, size,
// opacity and age. Positions are canvas pixels, velocities pixels per second.

use crate::color::Color;
use vecmath::Vector2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParticleKind {
    // Soft glowing mote with a brighter core
    Dust,
    // Cursor trail star, white core fading into the palette tint
    Spark,
    // Gradient line trailing behind its head, `length` pixels long
    Streak { length: f64 },
    // Plain dot
    Twinkle,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vector2<f64>,
    pub vel: Vector2<f64>,
    pub size: f64,
    pub opacity: f64,
    pub base_opacity: f64,
    // Offset into the opacity pulse, radians
    pub phase: f64,
    // Milliseconds, same clock as the frame timestamps
    pub created_at: f64,
    pub lifetime: Option<f64>,
    pub kind: ParticleKind,
    pub color: Color,
}

impl Particle {
    pub const MIN_SIZE: f64 = 0.1;

    pub fn new(
        pos: Vector2<f64>,
        vel: Vector2<f64>,
        size: f64,
        opacity: f64,
        created_at: f64,
    ) -> Particle {
        let opacity = opacity.max(0.0).min(1.0);
        Particle {
            pos,
            vel,
            size: size.max(Particle::MIN_SIZE),
            opacity,
            base_opacity: opacity,
            phase: 0.0,
            created_at,
            lifetime: None,
            kind: ParticleKind::Dust,
            color: Color::WHITE,
        }
    }

    pub fn with_kind(mut self, kind: ParticleKind) -> Particle {
        self.kind = kind;
        self
    }

    pub fn with_lifetime(mut self, lifetime: Option<f64>) -> Particle {
        self.lifetime = lifetime;
        self
    }

    pub fn with_color(mut self, color: Color) -> Particle {
        self.color = color;
        self
    }

    pub fn with_phase(mut self, phase: f64) -> Particle {
        self.phase = phase;
        self
    }

    pub fn age(&self, now: f64) -> f64 {
        (now - self.created_at).max(0.0)
    }

    pub fn is_expired(&self, now: f64) -> bool {
        match self.lifetime {
            Some(lifetime) => self.age(now) >= lifetime,
            None => false,
        }
    }

    // Fraction of the lifetime still left, 1 for immortal particles
    pub fn remaining(&self, now: f64) -> f64 {
        match self.lifetime {
            Some(lifetime) if lifetime > 0.0 => {
                (1.0 - self.age(now) / lifetime).max(0.0).min(1.0)
            }
            Some(_) => 0.0,
            None => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_opacity_and_size() {
        let p = Particle::new([0.0, 0.0], [0.0, 0.0], -2.0, 1.7, 0.0);
        assert_eq!(p.opacity, 1.0);
        assert_eq!(p.base_opacity, 1.0);
        assert_eq!(p.size, Particle::MIN_SIZE);
    }

    #[test]
    fn expiry_is_inclusive() {
        let p = Particle::new([0.0, 0.0], [0.0, 0.0], 2.0, 1.0, 100.0).with_lifetime(Some(800.0));
        assert!(!p.is_expired(899.0));
        assert!(p.is_expired(900.0));
        assert!((p.remaining(500.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn immortal_never_expires() {
        let p = Particle::new([0.0, 0.0], [0.0, 0.0], 2.0, 0.3, 0.0);
        assert!(!p.is_expired(1.0e12));
        assert_eq!(p.remaining(1.0e12), 1.0);
    }
}
