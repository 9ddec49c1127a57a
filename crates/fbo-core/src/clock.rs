//! Monotonic time sources used to rank render-target slots.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A monotonic time source.
///
/// Values only need to be comparable with each other; they are not wall-clock
/// time.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Time elapsed since the clock was created.
#[derive(Debug)]
pub struct MonotonicClock {
    created_at: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            created_at: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Used to get deterministic last-use ordering, including exact ties.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_when_advanced() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.now(), Duration::from_millis(5));

        clock.set(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_secs(1));
    }

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
