//! Cooperative cancellation for timed suspensions.
//!
//! Every place a simulation thread waits on the clock (inter-arrival gaps, retry
//! backoff, simulated service) goes through [`StopSignal::sleep`], which returns
//! as soon as the signal is raised instead of running out the full duration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Result of a cancellable sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full duration elapsed.
    Elapsed,
    /// The signal was raised before the duration elapsed.
    Cancelled,
}

impl SleepOutcome {
    /// True when the sleep was cut short.
    #[must_use]
    pub const fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Shared stop flag with Condvar-based wakeup of sleepers.
///
/// Cloning yields another handle to the same flag. The flag lives under the
/// mutex, so a raise that lands before or during a sleep is never lost.
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Create a signal in the lowered state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal and wake every sleeper. Idempotent.
    pub fn raise(&self) {
        let (flag, condvar) = self.inner.as_ref();
        let mut raised = flag.lock();
        *raised = true;
        drop(raised);
        condvar.notify_all();
    }

    /// Whether the signal has been raised.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Sleep for `duration` unless the signal is raised first.
    pub fn sleep(&self, duration: Duration) -> SleepOutcome {
        let deadline = Instant::now() + duration;
        let (flag, condvar) = self.inner.as_ref();
        let mut raised = flag.lock();
        while !*raised {
            if condvar.wait_until(&mut raised, deadline).timed_out() {
                return if *raised {
                    SleepOutcome::Cancelled
                } else {
                    SleepOutcome::Elapsed
                };
            }
        }
        SleepOutcome::Cancelled
    }
}

impl std::fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopSignal")
            .field("raised", &self.is_raised())
            .finish()
    }
}
