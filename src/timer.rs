use std::time::Instant;

/// A single-shot deadline owned by name. Arming replaces any previous
/// deadline; cancellation is synchronous and idempotent, so once `cancel`
/// returns the timer cannot fire again until re-armed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerHandle {
    deadline: Option<Instant>,
}

impl TimerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, at: Instant) {
        self.deadline = Some(at);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Take the deadline if it has passed. Returns the deadline itself so
    /// callers can chain the next arm from it rather than from `now`, which
    /// keeps a repeating schedule free of per-firing drift.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<Instant> {
        match self.deadline {
            Some(at) if at <= now => {
                self.deadline = None;
                Some(at)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_disarmed() {
        let timer = TimerHandle::new();
        assert!(!timer.is_armed());
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn does_not_fire_before_deadline() {
        let now = Instant::now();
        let mut timer = TimerHandle::new();
        timer.arm(now + Duration::from_millis(100));
        assert_eq!(timer.fire_if_due(now), None);
        assert!(timer.is_armed());
    }

    #[test]
    fn fires_exactly_at_deadline() {
        let now = Instant::now();
        let at = now + Duration::from_millis(100);
        let mut timer = TimerHandle::new();
        timer.arm(at);
        assert_eq!(timer.fire_if_due(at), Some(at));
        assert!(!timer.is_armed());
    }

    #[test]
    fn fires_once_per_arm() {
        let now = Instant::now();
        let mut timer = TimerHandle::new();
        timer.arm(now);
        assert!(timer.fire_if_due(now).is_some());
        assert_eq!(timer.fire_if_due(now), None);
    }

    #[test]
    fn cancel_is_idempotent() {
        let now = Instant::now();
        let mut timer = TimerHandle::new();
        timer.arm(now);
        timer.cancel();
        timer.cancel();
        assert!(!timer.is_armed());
        assert_eq!(timer.fire_if_due(now + Duration::from_secs(1)), None);
    }

    #[test]
    fn rearm_replaces_deadline() {
        let now = Instant::now();
        let mut timer = TimerHandle::new();
        timer.arm(now + Duration::from_millis(100));
        timer.arm(now + Duration::from_millis(500));
        assert_eq!(timer.fire_if_due(now + Duration::from_millis(100)), None);
        assert!(timer
            .fire_if_due(now + Duration::from_millis(500))
            .is_some());
    }
}
