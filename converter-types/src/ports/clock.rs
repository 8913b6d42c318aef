//! Timer source port.
//!
//! The engine never touches a timer directly, so tests can swap the host
//! timer for a virtual clock and drive ticks deterministically.

use std::fmt;
use std::time::Duration;

/// Callback run on every tick. It must not block.
pub type TickFn = Box<dyn Fn() + Send + Sync + 'static>;

/// Identifies a scheduled periodic timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Port trait for periodic scheduling.
pub trait Clock: Send + Sync + 'static {
    /// Runs `tick` every `interval`, first one `interval` from now.
    fn schedule_periodic(&self, interval: Duration, tick: TickFn) -> TimerHandle;

    /// Stops a timer. Unknown or already cancelled handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}
