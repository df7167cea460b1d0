// Renderer that turns the particle stores into draw calls on a 2D surface.
// It only reads particles, the surface decides how a glow or streak is drawn.

use crate::color::{Color, Palette};
use crate::config::PointerGlow;
use crate::particle::{Particle, ParticleKind};
use crate::store::ParticleStore;
use crate::Bounds;
use vecmath::{vec2_len, vec2_scale, vec2_sub, Vector2};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Color,
    pub alpha: f64,
}

impl ColorStop {
    pub fn new(offset: f64, color: Color, alpha: f64) -> ColorStop {
        ColorStop {
            offset,
            color,
            alpha: alpha.max(0.0).min(1.0),
        }
    }
}

// Something that can be drawn on, in practice a canvas 2D context.
pub trait Surface {
    type Error;

    fn clear(&mut self, bounds: Bounds) -> Result<(), Self::Error>;

    // Filled circle whose color runs through `stops` from the center outwards
    fn radial_glow(
        &mut self,
        center: Vector2<f64>,
        radius: f64,
        stops: &[ColorStop],
    ) -> Result<(), Self::Error>;

    fn disc(
        &mut self,
        center: Vector2<f64>,
        radius: f64,
        color: Color,
        alpha: f64,
    ) -> Result<(), Self::Error>;

    // Round-capped line from `head` to `tail`, colored along `stops`
    fn streak(
        &mut self,
        head: Vector2<f64>,
        tail: Vector2<f64>,
        width: f64,
        stops: &[ColorStop],
    ) -> Result<(), Self::Error>;
}

#[derive(Debug, Default, Clone)]
pub struct Renderer {
    frames_drawn: u64,
}

impl Renderer {
    const DUST_GLOW_SCALE: f64 = 3.0;
    const DUST_CORE_GAIN: f64 = 1.5;
    const SPARK_GLOW_SCALE: f64 = 2.0;
    const SPARK_CORE_SCALE: f64 = 0.5;
    const STREAK_HEAD_RADIUS: f64 = 8.0;

    pub fn new() -> Renderer {
        Renderer::default()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn clear_screen<S: Surface>(&mut self, surface: &mut S, bounds: Bounds) -> Result<(), S::Error> {
        self.frames_drawn += 1;
        surface.clear(bounds)
    }

    pub fn render_particles<S: Surface>(
        &self,
        surface: &mut S,
        particles: &ParticleStore,
        palette: &Palette,
    ) -> Result<(), S::Error> {
        for p in particles {
            if p.opacity <= 0.0 {
                continue;
            }
            match p.kind {
                ParticleKind::Dust => Renderer::draw_dust(surface, p)?,
                ParticleKind::Spark => Renderer::draw_spark(surface, p, palette)?,
                ParticleKind::Streak { length } => Renderer::draw_streak(surface, p, length, palette)?,
                ParticleKind::Twinkle => surface.disc(p.pos, p.size / 2.0, p.color, p.opacity)?,
            }
        }
        Ok(())
    }

    pub fn render_pointer_glow<S: Surface>(
        &self,
        surface: &mut S,
        pointer: Vector2<f64>,
        glow: &PointerGlow,
    ) -> Result<(), S::Error> {
        let stops = [
            ColorStop::new(0.0, glow.color, glow.intensity),
            ColorStop::new(0.4, glow.color, glow.intensity / 2.0),
            ColorStop::new(1.0, glow.color, 0.0),
        ];
        surface.radial_glow(pointer, glow.radius, &stops)
    }

    // Dust fades twice: the whole mote is drawn at `opacity` and its colors
    // carry `opacity` again, so the effective alpha is opacity squared
    fn draw_dust<S: Surface>(surface: &mut S, p: &Particle) -> Result<(), S::Error> {
        let stops = [
            ColorStop::new(0.0, p.color, p.opacity * p.opacity),
            ColorStop::new(1.0, p.color, 0.0),
        ];
        surface.radial_glow(p.pos, p.size * Renderer::DUST_GLOW_SCALE, &stops)?;
        let core = (p.opacity * Renderer::DUST_CORE_GAIN).min(1.0) * p.opacity;
        surface.disc(p.pos, p.size, p.color, core)
    }

    fn draw_spark<S: Surface>(surface: &mut S, p: &Particle, palette: &Palette) -> Result<(), S::Error> {
        let stops = [
            ColorStop::new(0.0, palette.highlight, p.opacity),
            ColorStop::new(0.5, p.color, 0.8 * p.opacity),
            ColorStop::new(1.0, p.color, 0.0),
        ];
        surface.radial_glow(p.pos, p.size * Renderer::SPARK_GLOW_SCALE, &stops)?;
        surface.disc(
            p.pos,
            p.size * Renderer::SPARK_CORE_SCALE,
            palette.highlight,
            p.opacity,
        )
    }

    fn draw_streak<S: Surface>(
        surface: &mut S,
        p: &Particle,
        length: f64,
        palette: &Palette,
    ) -> Result<(), S::Error> {
        let tail = vec2_sub(p.pos, vec2_scale(direction(p.vel), length));
        let trail = [
            ColorStop::new(0.0, palette.highlight, p.opacity),
            ColorStop::new(0.3, p.color, 0.8 * p.opacity),
            ColorStop::new(0.6, palette.fade, 0.5 * p.opacity),
            ColorStop::new(1.0, palette.fade, 0.0),
        ];
        surface.streak(p.pos, tail, p.size, &trail)?;

        let head = [
            ColorStop::new(0.0, palette.highlight, p.opacity),
            ColorStop::new(0.5, p.color, 0.8 * p.opacity),
            ColorStop::new(1.0, p.color, 0.0),
        ];
        surface.radial_glow(p.pos, Renderer::STREAK_HEAD_RADIUS, &head)
    }
}

// Unit vector along `vel`, pointing right for a particle at rest
fn direction(vel: Vector2<f64>) -> Vector2<f64> {
    let len = vec2_len(vel);
    if len > std::f64::EPSILON {
        vec2_scale(vel, 1.0 / len)
    } else {
        [1.0, 0.0]
    }
}
