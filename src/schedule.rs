// Deadline of an emitter's next interval spawn. The driver owns one per
// interval emitter, the host arms a real timeout for the earliest deadline.

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SpawnTimer {
    due_at: Option<f64>,
}

impl SpawnTimer {
    pub fn new() -> SpawnTimer {
        SpawnTimer::default()
    }

    pub fn arm(&mut self, now: f64, delay_ms: f64) {
        self.due_at = Some(now + delay_ms.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.due_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due_at.is_some()
    }

    // Disarms and returns true when the deadline has passed at `now`.
    // Stale or early fires leave the timer untouched.
    pub fn fire(&mut self, now: f64) -> bool {
        match self.due_at {
            Some(due) if now >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }

    // Time left until the deadline, never negative
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.due_at.map(|due| (due - now).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_deadline() {
        let mut timer = SpawnTimer::new();
        timer.arm(100.0, 2000.0);
        assert_eq!(timer.remaining(600.0), Some(1500.0));
        assert!(!timer.fire(2099.0));
        assert!(timer.fire(2100.0));
        assert!(!timer.fire(2200.0));
        assert!(!timer.is_armed());
    }

    #[test]
    fn cancel_disarms() {
        let mut timer = SpawnTimer::new();
        timer.arm(0.0, 10.0);
        timer.cancel();
        assert!(!timer.fire(1.0e9));
        assert_eq!(timer.remaining(0.0), None);
    }

    #[test]
    fn negative_delay_is_immediate() {
        let mut timer = SpawnTimer::new();
        timer.arm(50.0, -5.0);
        assert_eq!(timer.remaining(40.0), Some(10.0));
        assert!(timer.fire(50.0));
    }
}
