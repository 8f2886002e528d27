use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Collapses bursts of calls into a single delayed invocation.
///
/// Every [`call`](Debouncer::call) cancels the pending invocation (if any) and
/// schedules a new one `delay` from now, so only the last call of a burst
/// reaches the callback, with that call's arguments. Must be used from
/// within a tokio runtime.
pub struct Debouncer<A> {
    delay: Duration,
    callback: Arc<dyn Fn(A) + Send + Sync>,
    pending: Option<JoinHandle<()>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            delay,
            callback: Arc::new(callback),
            pending: None,
        }
    }

    /// Schedule the callback with `args`, replacing any pending call.
    pub fn call(&mut self, args: A) {
        self.cancel();
        // Deadline is fixed now, not when the timer task is first polled.
        let deadline = Instant::now() + self.delay;
        let callback = Arc::clone(&self.callback);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            callback(args);
        }));
    }

    /// Drop the pending call, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn recording(delay_ms: u64) -> (Debouncer<u32>, mpsc::UnboundedReceiver<u32>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(Duration::from_millis(delay_ms), move |v: u32| {
            let _ = tx.send(v);
        });
        (debouncer, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_once_with_last_args() {
        let (mut debouncer, mut rx) = recording(300);

        for i in 0..5 {
            debouncer.call(i);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(rx.try_recv().unwrap(), 4);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_outside_window_each_run() {
        let (mut debouncer, mut rx) = recording(300);

        debouncer.call(1);
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.call(2);
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(rx.try_recv().unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_pending_call() {
        let (mut debouncer, mut rx) = recording(300);

        debouncer.call(7);
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_call() {
        let (mut debouncer, mut rx) = recording(300);
        debouncer.call(9);
        drop(debouncer);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_pending_after_firing() {
        let (mut debouncer, mut rx) = recording(50);
        debouncer.call(3);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(rx.try_recv().unwrap(), 3);
        assert!(!debouncer.is_pending());
    }
}
