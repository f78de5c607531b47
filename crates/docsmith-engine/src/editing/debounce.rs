/// Default quiet period before a pending save is written.
pub const DEFAULT_DEBOUNCE_MS: u64 = 2_000;

/// A cancellable deadline driven by an external clock.
///
/// Re-arming replaces the previous deadline, so a burst of triggers fires
/// once, `window_ms` after the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    window_ms: u64,
    deadline: Option<u64>,
}

impl Debouncer {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            deadline: None,
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn arm(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(self.window_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Milliseconds left until the deadline, if armed.
    pub fn remaining(&self, now_ms: u64) -> Option<u64> {
        self.deadline.map(|d| d.saturating_sub(now_ms))
    }

    /// Returns true exactly once when the quiet period has elapsed.
    pub fn fire(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unarmed_never_fires() {
        let mut d = Debouncer::new(100);
        assert!(!d.fire(1_000_000));
        assert_eq!(d.remaining(0), None);
    }

    #[test]
    fn fires_once_after_window() {
        let mut d = Debouncer::new(100);
        d.arm(0);
        assert!(!d.fire(99));
        assert!(d.fire(100));
        assert!(!d.fire(200));
        assert!(!d.is_armed());
    }

    #[test]
    fn rearming_pushes_deadline_back() {
        let mut d = Debouncer::new(100);
        d.arm(0);
        d.arm(80);
        assert!(!d.fire(150));
        assert_eq!(d.remaining(150), Some(30));
        assert!(d.fire(180));
    }

    #[test]
    fn cancel_disarms() {
        let mut d = Debouncer::default();
        assert_eq!(d.window_ms(), DEFAULT_DEBOUNCE_MS);
        d.arm(0);
        d.cancel();
        assert!(!d.fire(u64::MAX));
    }
}
