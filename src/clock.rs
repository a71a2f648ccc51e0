//! Time sources for the engines.
//!
//! The engines never read the wall clock. Every timing rule (repeat delay,
//! repeat frequency, double-click window) is evaluated against an
//! [`ElapsedTime`] supplied at construction, so tests can drive time by hand
//! with a [`ManualClock`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonically increasing elapsed-time query.
pub trait ElapsedTime {
    /// Time elapsed since the source was started.
    fn elapsed(&self) -> Duration;
}

/// Real clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Start a new stopwatch at zero.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

impl ElapsedTime for Stopwatch {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Synthetic clock advanced explicitly by the caller.
///
/// Clones share the same time, so a test can hand one clone to an engine and
/// keep another to move time forward.
///
/// ```
/// use polled_input::clock::{ElapsedTime, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance_ms(250);
/// assert_eq!(clock.elapsed().as_millis(), 250);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Move time forward by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute reading. Moving backwards is ignored.
    pub fn set(&self, at: Duration) {
        if at >= self.now.get() {
            self.now.set(at);
        }
    }
}

impl ElapsedTime for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }
}

impl<T: ElapsedTime + ?Sized> ElapsedTime for Rc<T> {
    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();

        other.advance_ms(40);
        clock.advance(Duration::from_millis(2));

        assert_eq!(clock.elapsed(), Duration::from_millis(42));
        assert_eq!(other.elapsed(), Duration::from_millis(42));
    }

    #[test]
    fn test_manual_clock_never_goes_backwards() {
        let clock = ManualClock::new();
        clock.set(Duration::from_millis(100));
        clock.set(Duration::from_millis(50));
        assert_eq!(clock.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn test_stopwatch_is_monotonic() {
        let watch = Stopwatch::start();
        let first = watch.elapsed();
        let second = watch.elapsed();
        assert!(second >= first);
    }
}
