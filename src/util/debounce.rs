//! Cancellable one-shot timer for collapsing input bursts.
//!
//! DESIGN
//! ======
//! Each `schedule` aborts the previous timer task and starts a new one. When
//! a timer elapses, the action is spawned as its own task, so a later
//! `schedule` or `cancel` only ever stops timers that have not fired yet.
//! Work that has already started is never interrupted.

#[cfg(test)]
#[path = "debounce_test.rs"]
mod debounce_test;

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending timer with one that runs `action` after the delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&mut self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            drop(tokio::spawn(action()));
        }));
    }

    /// Stop the pending timer, if any. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        let Some(handle) = self.pending.take() else {
            return false;
        };
        let waiting = !handle.is_finished();
        handle.abort();
        waiting
    }

    /// Whether a timer is scheduled and has not fired.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
