// Smooth pseudo-random field built from layered sines and cosines.
// Cheap, continuous and fully deterministic, which is all the drift needs.

use vecmath::Vector2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NoiseField {
    pub frequency: f64,
    // How far the field slides per unit of noise time
    pub time_shift: f64,
}

impl Default for NoiseField {
    fn default() -> Self {
        NoiseField {
            frequency: 0.01,
            time_shift: 10.0,
        }
    }
}

impl NoiseField {
    const DETAIL_WEIGHT: f64 = 0.35;
    const DETAIL_SCALE: f64 = 2.7;

    // Sample in [0, 1]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let f = self.frequency;
        let coarse = (x * f).sin() * (y * f).cos();
        let fd = f * Self::DETAIL_SCALE;
        let detail = (x * fd + 1.3).cos() * (y * fd - 0.7).sin();
        let n = coarse * (1.0 - Self::DETAIL_WEIGHT) + detail * Self::DETAIL_WEIGHT;
        (n * 0.5 + 0.5).max(0.0).min(1.0)
    }

    // Drift direction at `pos` for noise time `t`, each axis in [-1, 1]
    pub fn drift(&self, pos: Vector2<f64>, t: f64) -> Vector2<f64> {
        let shift = t * self.time_shift;
        [
            self.sample(pos[0] + shift, pos[1]) * 2.0 - 1.0,
            self.sample(pos[0], pos[1] + shift) * 2.0 - 1.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_stays_in_unit_range() {
        let field = NoiseField::default();
        for i in 0..500 {
            let x = i as f64 * 37.3 - 4000.0;
            let y = i as f64 * -11.9 + 900.0;
            let n = field.sample(x, y);
            assert!(n >= 0.0 && n <= 1.0, "{} out of range", n);
        }
    }

    #[test]
    fn drift_is_deterministic() {
        let field = NoiseField::default();
        let a = field.drift([120.0, 45.0], 3.5);
        let b = field.drift([120.0, 45.0], 3.5);
        assert_eq!(a, b);
        assert!(a[0].abs() <= 1.0 && a[1].abs() <= 1.0);
    }

    #[test]
    fn field_is_continuous() {
        let field = NoiseField::default();
        let a = field.sample(300.0, 200.0);
        let b = field.sample(300.01, 200.01);
        assert!((a - b).abs() < 1e-3);
    }
}
