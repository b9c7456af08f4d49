//! Panel lifecycle primitives
//!
//! - [`Subscription`]: liveness flag owned by a mounted panel. Results are
//!   only published while it is active.
//! - [`schedule`]: repeating task that fires on a fixed interval until its
//!   [`TaskHandle`] is cancelled or dropped.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Shared liveness flag for one mounted consumer
#[derive(Debug, Clone)]
pub struct Subscription {
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// Create an active subscription
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether the consumer is still mounted
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Mark the consumer as torn down. Idempotent; affects every clone.
    pub fn dispose(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a repeating task started with [`schedule`]
#[derive(Debug)]
pub struct TaskHandle {
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl TaskHandle {
    /// Stop future invocations. Invocations already spawned keep running.
    ///
    /// Calling this more than once is a no-op.
    pub fn cancel(&self) {
        let ticker = match self.ticker.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(ticker) = ticker {
            ticker.abort();
            tracing::debug!("Repeating task cancelled");
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        match self.ticker.lock() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run `task` now and then once per `interval`.
///
/// Each invocation is spawned as its own tokio task, so a slow invocation
/// never delays the next tick and may overlap it. Must be called from within
/// a tokio runtime. A zero `interval` schedules nothing and returns an
/// already-cancelled handle.
pub fn schedule<F, Fut>(interval: Duration, task: F) -> TaskHandle
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    if interval.is_zero() {
        tracing::error!("Refusing to schedule a task with a zero interval");
        return TaskHandle {
            ticker: Mutex::new(None),
        };
    }

    let ticker = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            tokio::spawn(task());
        }
    });

    TaskHandle {
        ticker: Mutex::new(Some(ticker)),
    }
}
