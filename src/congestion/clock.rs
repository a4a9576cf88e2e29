//! Clock implementations.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::core::Clock;

/// Wall-clock time from [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to a controller:
///
/// ```
/// use std::time::Duration;
/// use tahoe_cc::congestion::ManualClock;
/// use tahoe_cc::core::Clock;
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// let start = clock.now();
///
/// handle.advance(Duration::from_millis(40));
/// assert_eq!(clock.now() - start, Duration::from_millis(40));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a clock frozen at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            current: Rc::new(Cell::new(start)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.current.set(self.current.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.current.get()
    }
}

/// Time from the tokio timer, which honours paused test time.
#[cfg(feature = "simulation")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[cfg(feature = "simulation")]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
