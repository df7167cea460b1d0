// Random source the spawner draws every randomized parameter from.
// Any rand generator works, tests can hand in a fixed sequence instead.

use rand::{Rng, RngCore};

pub trait RandomSource {
    // Uniform sample in [0, 1)
    fn next_f64(&mut self) -> f64;

    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}

impl<R: RngCore> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

// Replays the given values in order, wrapping around at the end.
// An empty sequence always yields 0.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedSequence {
    pub fn new(values: Vec<f64>) -> Self {
        FixedSequence { values, cursor: 0 }
    }

    pub fn constant(value: f64) -> Self {
        FixedSequence::new(vec![value])
    }
}

impl RandomSource for FixedSequence {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = (self.cursor + 1) % self.values.len();
        value.max(0.0).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fixed_sequence_wraps() {
        let mut seq = FixedSequence::new(vec![0.25, 0.75]);
        assert_eq!(seq.next_f64(), 0.25);
        assert_eq!(seq.next_f64(), 0.75);
        assert_eq!(seq.next_f64(), 0.25);
        assert_eq!(FixedSequence::new(Vec::new()).next_f64(), 0.0);
    }

    #[test]
    fn range_maps_unit_interval() {
        let mut seq = FixedSequence::constant(0.5);
        assert_eq!(seq.range(10.0, 20.0), 15.0);
        assert!(!seq.chance(0.5));
        assert!(seq.chance(0.6));
    }

    #[test]
    fn seeded_rng_is_repeatable() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..16 {
            let x = a.range(-3.0, 3.0);
            assert_eq!(x, b.range(-3.0, 3.0));
            assert!(x >= -3.0 && x < 3.0);
        }
    }
}
