//! Monotonic time sources for round timing.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Elapsed time since the clock's origin.
pub trait Clock {
    fn elapsed(&self) -> Duration;
}

/// `Instant`-backed clock; the origin is the moment of construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::start()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for deterministic timings.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    step: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock that moves forward by `step` every time it is read.
    pub fn stepping(step: Duration) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            step,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        let now = self.now.get() + self.step;
        self.now.set(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_when_told() {
        let clock = ManualClock::new();
        assert_eq!(clock.elapsed(), Duration::ZERO);
        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.elapsed(), Duration::from_millis(5));
        assert_eq!(clock.elapsed(), Duration::from_millis(5));
    }

    #[test]
    fn stepping_clock_advances_per_read() {
        let clock = ManualClock::stepping(Duration::from_secs(1));
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::start();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
    }
}
