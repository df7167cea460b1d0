// Live particles of one emitter, oldest first. The cap is enforced on insert.

use crate::config::CapPolicy;
use crate::particle::Particle;
use std::collections::vec_deque;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ParticleStore {
    particles: VecDeque<Particle>,
    cap: usize,
    policy: CapPolicy,
}

impl ParticleStore {
    pub fn new(cap: usize, policy: CapPolicy) -> ParticleStore {
        ParticleStore {
            particles: VecDeque::with_capacity(cap),
            cap,
            policy,
        }
    }

    // Adds `particle`, returns false when the cap rejected it.
    // With `EvictOldest` the oldest particles are dropped to make room.
    pub fn insert(&mut self, particle: Particle) -> bool {
        if self.cap == 0 {
            return false;
        }
        if self.is_full() {
            match self.policy {
                CapPolicy::Reject => return false,
                CapPolicy::EvictOldest => {
                    while self.particles.len() >= self.cap {
                        self.particles.pop_front();
                    }
                }
            }
        }
        self.particles.push_back(particle);
        true
    }

    // Removes every particle matching `pred`, returns how many went
    pub fn remove_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&Particle) -> bool,
    {
        let before = self.particles.len();
        self.particles.retain(|p| !pred(p));
        before - self.particles.len()
    }

    // Mutating pass used by the stepper, `keep` returning false drops the particle
    pub fn retain_mut<F>(&mut self, keep: F)
    where
        F: FnMut(&mut Particle) -> bool,
    {
        self.particles.retain_mut(keep);
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.cap
    }
}

impl<'a> IntoIterator for &'a ParticleStore {
    type Item = &'a Particle;
    type IntoIter = vec_deque::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle_at(created_at: f64) -> Particle {
        Particle::new([created_at, 0.0], [0.0, 0.0], 1.0, 1.0, created_at)
    }

    #[test]
    fn evict_oldest_keeps_newest() {
        let mut store = ParticleStore::new(50, CapPolicy::EvictOldest);
        for i in 0..60 {
            assert!(store.insert(particle_at(i as f64)));
            assert!(store.len() <= 50);
        }
        assert_eq!(store.len(), 50);
        let oldest = store.iter().next().map(|p| p.created_at);
        assert_eq!(oldest, Some(10.0));
    }

    #[test]
    fn reject_keeps_existing() {
        let mut store = ParticleStore::new(60, CapPolicy::Reject);
        for i in 0..60 {
            assert!(store.insert(particle_at(i as f64)));
        }
        assert!(store.is_full());
        assert!(!store.insert(particle_at(60.0)));
        assert_eq!(store.len(), 60);
        assert!(store.iter().all(|p| p.created_at < 60.0));
    }

    #[test]
    fn zero_cap_holds_nothing() {
        let mut store = ParticleStore::new(0, CapPolicy::EvictOldest);
        assert!(!store.insert(particle_at(0.0)));
        assert!(store.is_empty());
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut store = ParticleStore::new(4, CapPolicy::Reject);
        store.insert(particle_at(1.0));
        assert_eq!(store.remove_where(|p| p.created_at > 100.0), 0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.remove_where(|p| p.created_at == 1.0), 1);
        assert!(store.is_empty());
    }
}
