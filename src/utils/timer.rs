//! Owned, cancellable timer handles
//!
//! Retry, debounce and controls-hide timers must be cancelled on
//! teardown, on new-source load, and on drop so no callback fires
//! against a disposed surface. Both helpers here wrap a spawned tokio
//! task whose handle is aborted on cancellation, so teardown is
//! deterministic rather than relying on ambient timeouts.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A single deferred action that can be cancelled before it fires.
#[derive(Debug, Default)]
pub struct TimerHandle {
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    pub fn new() -> Self {
        Self { task: None }
    }

    /// Schedule `fut` to run after `delay`, cancelling any previously
    /// scheduled action on this handle.
    pub fn schedule<F>(&mut self, delay: Duration, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fut.await;
        }));
    }

    /// Cancel the pending action, if any.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether an action is currently scheduled (and not yet known to
    /// have completed).
    pub fn is_scheduled(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Debouncer: coalesces a burst of rapid calls into one, fired after a
/// quiet period. Each call replaces the previous pending action, so
/// only the latest one runs.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    timer: TimerHandle,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            timer: TimerHandle::new(),
        }
    }

    /// Schedule `fut` to run after the quiet period, replacing any
    /// pending call.
    pub fn call<F>(&mut self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.timer.schedule(self.delay, fut);
    }

    /// Drop the pending call without running it.
    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_scheduled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    // Lets spawned timer tasks run after the paused clock advances.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut timer = TimerHandle::new();

        let f = Arc::clone(&fired);
        timer.schedule(Duration::from_millis(100), async move {
            f.fetch_add(1, Ordering::SeqCst);
        });
        // Let the spawned task register its deadline first
        settle().await;

        tokio::time::advance(Duration::from_millis(50)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(60)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_cancel_prevents_firing() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut timer = TimerHandle::new();

        let f = Arc::clone(&fired);
        timer.schedule(Duration::from_millis(100), async move {
            f.fetch_add(1, Ordering::SeqCst);
        });
        timer.cancel();

        tokio::time::advance(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_rapid_calls() {
        let calls = Arc::new(AtomicU32::new(0));
        let last = Arc::new(AtomicU32::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        // Ten rapid calls within the quiet period
        for i in 0..10u32 {
            let c = Arc::clone(&calls);
            let l = Arc::clone(&last);
            debouncer.call(async move {
                c.fetch_add(1, Ordering::SeqCst);
                l.store(i + 1, Ordering::SeqCst);
            });
            tokio::time::advance(Duration::from_millis(10)).await;
            settle().await;
        }

        tokio::time::advance(Duration::from_millis(310)).await;
        settle().await;

        // Exactly one call ran, carrying the latest value
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_cancel_on_teardown() {
        let fired = Arc::new(AtomicU32::new(0));
        {
            let mut debouncer = Debouncer::new(Duration::from_millis(300));
            let f = Arc::clone(&fired);
            debouncer.call(async move {
                f.fetch_add(1, Ordering::SeqCst);
            });
            // Dropped here with the call still pending
        }

        tokio::time::advance(Duration::from_millis(400)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
