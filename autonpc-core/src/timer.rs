//! Tick-driven countdown timers for the decision loop cycles.

/// Countdown decremented by tick `diff`; fires and re-arms when it reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTimer {
    interval_ms: u64,
    remaining_ms: u64,
}

impl CycleTimer {
    /// A timer that first fires after one full interval.
    #[must_use]
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            remaining_ms: interval_ms,
        }
    }

    /// A timer that first fires after `first_ms`, then every `interval_ms`.
    #[must_use]
    pub const fn with_first(interval_ms: u64, first_ms: u64) -> Self {
        Self {
            interval_ms,
            remaining_ms: first_ms,
        }
    }

    /// Advance by `diff` milliseconds. Returns `true` if the timer fired.
    ///
    /// A long tick fires at most once; the countdown restarts from the full
    /// interval rather than trying to catch up.
    pub fn tick(&mut self, diff: u64) -> bool {
        if diff >= self.remaining_ms {
            self.remaining_ms = self.interval_ms;
            true
        } else {
            self.remaining_ms -= diff;
            false
        }
    }

    /// Re-arm with a new delay (used by the exploration cycle's rolled delay).
    pub fn reset_to(&mut self, delay_ms: u64) {
        self.remaining_ms = delay_ms;
    }

    /// Milliseconds until the next firing.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.remaining_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_interval() {
        let mut t = CycleTimer::new(2000);
        assert!(!t.tick(1000));
        assert!(!t.tick(999));
        assert!(t.tick(1));
        assert_eq!(t.remaining(), 2000);
    }

    #[test]
    fn long_tick_fires_once() {
        let mut t = CycleTimer::new(100);
        assert!(t.tick(10_000));
        assert!(!t.tick(50));
    }

    #[test]
    fn rolled_delay_overrides_next_firing() {
        let mut t = CycleTimer::with_first(15_000, 0);
        assert!(t.tick(0));
        t.reset_to(30_000);
        assert!(!t.tick(29_999));
        assert!(t.tick(1));
    }
}
