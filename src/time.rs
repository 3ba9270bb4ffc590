//! Monotonic timestamps for input events.

use ::std::{
    fmt::{self, Display},
    time::{Duration, Instant},
};

/// A point on a steady clock, measured as the time elapsed since the clock's
/// own epoch. Never derived from wall-clock time, so it never goes backwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonotonicTimestamp(Duration);

impl MonotonicTimestamp {
    pub const fn from_elapsed(elapsed: Duration) -> Self {
        Self(elapsed)
    }

    pub const fn elapsed(&self) -> Duration {
        self.0
    }

    /// Time between `earlier` and `self`, saturating at zero.
    pub fn since(&self, earlier: MonotonicTimestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Display for MonotonicTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.0.as_secs_f64())
    }
}

/// Source of [`MonotonicTimestamp`]s used to stamp events as they arrive.
pub trait Clock {
    fn now(&self) -> MonotonicTimestamp;
}

/// A [`Clock`] backed by [`Instant`], with its epoch at construction.
#[derive(Clone, Copy, Debug)]
pub struct SteadyClock {
    epoch: Instant,
}

impl Default for SteadyClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SteadyClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Clock for SteadyClock {
    fn now(&self) -> MonotonicTimestamp {
        MonotonicTimestamp(self.epoch.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steady_clock_never_goes_backwards() {
        let clock = SteadyClock::new();
        let mut previous = clock.now();
        for _ in 0..1000 {
            let now = clock.now();
            assert!(now >= previous);
            previous = now;
        }
    }

    #[test]
    fn test_since_saturates() {
        let early = MonotonicTimestamp::from_elapsed(Duration::from_millis(5));
        let late = MonotonicTimestamp::from_elapsed(Duration::from_millis(12));
        assert_eq!(late.since(early), Duration::from_millis(7));
        assert_eq!(early.since(late), Duration::ZERO);
    }
}
