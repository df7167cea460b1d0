// Simple color struct, created from an unsigned 32 representing RRGGBBAA,
// plus the palettes the effects pick their tints from

use crate::random::RandomSource;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::from_u32(0xffffffff);
    pub const COSMIC_PINK: Color = Color::from_u32(0xe91e8cff);
    pub const HOT_PINK: Color = Color::from_u32(0xff006eff);
    pub const NEBULA_PURPLE: Color = Color::from_u32(0x8b5cf6ff);
    pub const CYAN: Color = Color::from_u32(0x00d9ffff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    pub const fn from_u32(num: u32) -> Color {
        let r = (num >> 24) as u8;
        let g = (num >> 16) as u8;
        let b = (num >> 8) as u8;
        let a = num as u8;

        Color { r, g, b, a }
    }

    // CSS color string with the given alpha, the color's own alpha is ignored
    pub fn to_css(&self, alpha: f64) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            alpha.max(0.0).min(1.0)
        )
    }
}

// Colors an emitter draws with. A particle spawns with `base`, or with
// `accent` at probability `accent_chance`. `highlight` is for bright cores
// and streak heads and `fade` is what gradients fade out to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Palette {
    pub base: Color,
    pub accent: Color,
    pub accent_chance: f64,
    pub highlight: Color,
    pub fade: Color,
}

impl Palette {
    pub fn pick(&self, rng: &mut dyn RandomSource) -> Color {
        if rng.chance(self.accent_chance) {
            self.accent
        } else {
            self.base
        }
    }

    pub const fn dust() -> Palette {
        Palette {
            base: Color::WHITE,
            accent: Color::NEBULA_PURPLE,
            accent_chance: 0.3,
            highlight: Color::WHITE,
            fade: Color::NEBULA_PURPLE,
        }
    }

    pub const fn trail() -> Palette {
        Palette {
            base: Color::COSMIC_PINK,
            accent: Color::COSMIC_PINK,
            accent_chance: 0.0,
            highlight: Color::WHITE,
            fade: Color::COSMIC_PINK,
        }
    }

    pub const fn shooting_star() -> Palette {
        Palette {
            base: Color::HOT_PINK,
            accent: Color::HOT_PINK,
            accent_chance: 0.0,
            highlight: Color::WHITE,
            fade: Color::NEBULA_PURPLE,
        }
    }

    pub const fn meteor() -> Palette {
        Palette {
            base: Color::CYAN,
            accent: Color::CYAN,
            accent_chance: 0.0,
            highlight: Color::WHITE,
            fade: Color::CYAN,
        }
    }

    pub const fn starfield() -> Palette {
        Palette {
            base: Color::WHITE,
            accent: Color::WHITE,
            accent_chance: 0.0,
            highlight: Color::WHITE,
            fade: Color::WHITE,
        }
    }
}
