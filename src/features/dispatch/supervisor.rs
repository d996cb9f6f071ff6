//! Supervised handler tasks
//!
//! Every dispatched handler runs in its own tokio task. A second task awaits
//! it and turns errors and panics into log lines, so a failing handler never
//! reaches the ingestion loop.

use anyhow::Result;
use log::{debug, error, warn};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed,
    Panicked,
    Cancelled,
}

#[derive(Debug, Default)]
struct Counters {
    spawned: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Counters shared between a supervisor and anyone reporting on it.
#[derive(Debug, Clone, Default)]
pub struct TaskStats {
    inner: Arc<Counters>,
}

impl TaskStats {
    pub fn spawned(&self) -> u64 {
        self.inner.spawned.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.inner.completed.load(Ordering::Relaxed)
    }

    /// Tasks that returned an error, panicked, or were cancelled.
    pub fn failed(&self) -> u64 {
        self.inner.failed.load(Ordering::Relaxed)
    }

    pub fn in_flight(&self) -> u64 {
        self.spawned()
            .saturating_sub(self.completed() + self.failed())
    }

    fn record_spawn(&self) {
        self.inner.spawned.fetch_add(1, Ordering::Relaxed);
    }

    fn record(&self, outcome: TaskOutcome) {
        let counter = match outcome {
            TaskOutcome::Completed => &self.inner.completed,
            _ => &self.inner.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone)]
pub struct TaskSupervisor {
    tier: &'static str,
    stats: TaskStats,
}

impl TaskSupervisor {
    pub fn new(tier: &'static str, stats: TaskStats) -> Self {
        Self { tier, stats }
    }

    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }

    /// Launch `task` without waiting for it.
    ///
    /// The returned handle resolves once the task finished and its outcome
    /// was logged and counted.
    pub fn spawn(&self, label: String, task: HandlerFuture) -> JoinHandle<TaskOutcome> {
        self.stats.record_spawn();
        let handle = tokio::spawn(task);
        let stats = self.stats.clone();
        let tier = self.tier;

        tokio::spawn(async move {
            let outcome = match handle.await {
                Ok(Ok(())) => {
                    debug!("[{tier}] {label} finished");
                    TaskOutcome::Completed
                }
                Ok(Err(e)) => {
                    warn!("[{tier}] {label} failed: {e:#}");
                    TaskOutcome::Failed
                }
                Err(e) if e.is_panic() => {
                    error!("[{tier}] {label} panicked");
                    TaskOutcome::Panicked
                }
                Err(_) => {
                    warn!("[{tier}] {label} was cancelled");
                    TaskOutcome::Cancelled
                }
            };
            stats.record(outcome);
            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn supervisor() -> TaskSupervisor {
        TaskSupervisor::new("test", TaskStats::default())
    }

    fn ready(result: Result<()>) -> HandlerFuture {
        Box::pin(async move { result })
    }

    #[tokio::test]
    async fn test_completed_task_counted() {
        let supervisor = supervisor();
        let outcome = supervisor
            .spawn("ok".into(), ready(Ok(())))
            .await
            .unwrap();

        assert_eq!(outcome, TaskOutcome::Completed);
        assert_eq!(supervisor.stats().spawned(), 1);
        assert_eq!(supervisor.stats().completed(), 1);
        assert_eq!(supervisor.stats().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_error_is_contained() {
        let supervisor = supervisor();
        let outcome = supervisor
            .spawn("err".into(), ready(Err(anyhow!("boom"))))
            .await
            .unwrap();

        assert_eq!(outcome, TaskOutcome::Failed);
        assert_eq!(supervisor.stats().failed(), 1);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let supervisor = supervisor();
        let outcome = supervisor
            .spawn(
                "panic".into(),
                Box::pin(async {
                    if true {
                        panic!("handler bug");
                    }
                    Ok::<(), anyhow::Error>(())
                }),
            )
            .await
            .unwrap();

        assert_eq!(outcome, TaskOutcome::Panicked);
        assert_eq!(supervisor.stats().failed(), 1);

        // the supervisor keeps working afterwards
        let next = supervisor
            .spawn("after".into(), ready(Ok(())))
            .await
            .unwrap();
        assert_eq!(next, TaskOutcome::Completed);
    }

    #[tokio::test]
    async fn test_in_flight_while_running() {
        let supervisor = supervisor();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let watcher = supervisor.spawn(
            "slow".into(),
            Box::pin(async move {
                let _ = release_rx.await;
                Ok::<(), anyhow::Error>(())
            }),
        );
        assert_eq!(supervisor.stats().in_flight(), 1);

        release_tx.send(()).unwrap();
        watcher.await.unwrap();
        assert_eq!(supervisor.stats().in_flight(), 0);
    }
}
