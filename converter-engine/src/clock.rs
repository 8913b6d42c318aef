//! Clock adapters: the tokio timer for production and a virtual clock for
//! deterministic tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use converter_types::{Clock, TickFn, TimerHandle};
use dashmap::DashMap;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Shortest period either clock will honour.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

// ─────────────────────────────────────────────────────────────────────────────
// Tokio Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Host timer backed by tokio. Each timer is its own task.
///
/// Must be used from within a tokio runtime.
#[derive(Default)]
pub struct TokioClock {
    timers: DashMap<TimerHandle, AbortHandle>,
    next_id: AtomicU64,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for TokioClock {
    fn schedule_periodic(&self, interval: Duration, tick: TickFn) -> TimerHandle {
        let handle = TimerHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let period = interval.max(MIN_PERIOD);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tick();
            }
        });

        tracing::debug!(timer = %handle, ?period, "Scheduled periodic timer");
        self.timers.insert(handle, task.abort_handle());
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some((_, task)) = self.timers.remove(&handle) {
            task.abort();
            tracing::debug!(timer = %handle, "Cancelled periodic timer");
        }
    }
}

impl Drop for TokioClock {
    fn drop(&mut self) {
        for entry in self.timers.iter() {
            entry.value().abort();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Manual Clock
// ─────────────────────────────────────────────────────────────────────────────

struct ManualTimer {
    interval: Duration,
    next_due: Duration,
    tick: Arc<dyn Fn() + Send + Sync>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerHandle, ManualTimer>,
}

/// Virtual clock. Time only moves when [`ManualClock::advance`] is called,
/// and due ticks run synchronously on the caller.
#[derive(Default)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of timers that have not been cancelled.
    pub fn active_timers(&self) -> usize {
        self.lock().timers.len()
    }

    /// Moves time forward by `by`, firing every tick that falls due, in time
    /// order. A timer due several times within `by` fires several times.
    ///
    /// Ticks fire back to back; work they enqueue runs only after this
    /// returns. Use [`ManualClock::advance_with`] to let it run in between.
    pub fn advance(&self, by: Duration) {
        let target = self.lock().now + by;
        // Run without the lock so the callback may schedule or cancel.
        while let Some(tick) = self.next_due(target) {
            tick();
        }
    }

    /// Like [`ManualClock::advance`], but awaits `between()` after each tick
    /// so the work that tick started can finish before time moves on.
    pub async fn advance_with<F, Fut>(&self, by: Duration, mut between: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let target = self.lock().now + by;
        while let Some(tick) = self.next_due(target) {
            tick();
            between().await;
        }
    }

    /// Pops the earliest tick due at or before `target` and moves `now` to
    /// it. With nothing left, `now` becomes `target`.
    fn next_due(&self, target: Duration) -> Option<Arc<dyn Fn() + Send + Sync>> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let due = state
            .timers
            .iter_mut()
            .filter(|(_, timer)| timer.next_due <= target)
            .min_by_key(|(handle, timer)| (timer.next_due, **handle));

        match due {
            Some((_, timer)) => {
                state.now = timer.next_due;
                timer.next_due += timer.interval;
                Some(timer.tick.clone())
            }
            None => {
                state.now = target;
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn schedule_periodic(&self, interval: Duration, tick: TickFn) -> TimerHandle {
        let mut state = self.lock();
        state.next_id += 1;
        let handle = TimerHandle::new(state.next_id);
        let interval = interval.max(MIN_PERIOD);
        let next_due = state.now + interval;
        state.timers.insert(
            handle,
            ManualTimer {
                interval,
                next_due,
                tick: Arc::from(tick),
            },
        );
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.lock().timers.remove(&handle);
    }
}
