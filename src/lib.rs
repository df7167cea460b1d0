#[macro_use]
mod utils;

pub mod color;
pub mod config;
pub mod driver;
pub mod magnetic;
pub mod noise;
pub mod particle;
pub mod random;
pub mod renderer;
pub mod schedule;
pub mod spawner;
pub mod stepper;
pub mod store;
pub mod web;

use wasm_bindgen::prelude::*;

pub use crate::color::{Color, Palette};
pub use crate::config::{EffectConfig, EmitterConfig};
pub use crate::driver::{DriverState, FrameDriver};
pub use crate::particle::{Particle, ParticleKind};
pub use crate::random::RandomSource;
pub use crate::renderer::{Renderer, Surface};
pub use crate::store::ParticleStore;
pub use crate::utils::Timer;
pub use crate::web::{CosmicEffect, EffectOptions, MagneticElement};

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn initialize() {
    utils::set_panic_hook();
}

// Size of the drawing surface in pixels
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Bounds {
        Bounds {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}
