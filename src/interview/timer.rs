//! Cancelable simulated-latency tasks.
//!
//! Each pending reply or submission runs as a spawned task owned by a
//! `PendingTask`. Cancelling or dropping the handle aborts the task, so a
//! torn-down interview never receives a late continuation.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Owning handle to a spawned continuation.
#[derive(Debug)]
pub struct PendingTask {
    handle: Option<JoinHandle<()>>,
}

impl PendingTask {
    /// Run `work` on the runtime right away.
    pub fn spawn<F>(work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(work)),
        }
    }

    /// Run `work` once `delay` has elapsed.
    pub fn after<F>(delay: Duration, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        })
    }

    /// Abort the task if it has not finished yet.
    pub fn cancel(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait for the task to end, either by completing or by being cancelled.
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for PendingTask {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn runs_after_delay() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let task = PendingTask::after(Duration::from_millis(1500), async move {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(!fired.load(Ordering::SeqCst));
        assert!(task.is_pending());

        task.join().await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_work() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let task = PendingTask::after(Duration::from_millis(1500), async move {
            flag.store(true, Ordering::SeqCst);
        });
        task.cancel();
        task.join().await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        drop(PendingTask::after(Duration::from_millis(10), async move {
            flag.store(true, Ordering::SeqCst);
        }));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
