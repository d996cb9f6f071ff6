//! # Feature: Dispatch
//!
//! The two dispatch tiers and the loop they share. A [`Listener`] turns chat
//! messages into payloads; a [`Processor`] runs payloads by command id. Both
//! read an `mpsc` channel on one sequential loop and hand every match to a
//! [`TaskSupervisor`].
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod help;
pub mod listener;
pub mod processor;
pub mod supervisor;

use log::info;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use help::{compose_help, render_help, NO_COMMANDS};
pub use listener::Listener;
pub use processor::Processor;
pub use supervisor::{HandlerFuture, TaskOutcome, TaskStats, TaskSupervisor};

/// A routed item, ready to be spawned.
pub struct Dispatch {
    /// Shown in the supervisor's log lines.
    pub label: String,
    pub task: HandlerFuture,
}

impl Dispatch {
    pub fn new(label: impl Into<String>, task: HandlerFuture) -> Self {
        Self {
            label: label.into(),
            task,
        }
    }
}

/// Routing strategy of one tier.
///
/// `route` runs on the ingestion loop and must not block; the work it
/// selects goes into the returned future.
pub trait Router: Send + Sync + 'static {
    type Item: Send + 'static;

    fn tier(&self) -> &'static str;

    fn route(&self, item: Self::Item) -> Option<Dispatch>;
}

/// Sequential ingestion loop over a frozen router.
pub struct DispatchLoop<R: Router> {
    router: R,
    supervisor: TaskSupervisor,
}

impl<R: Router> DispatchLoop<R> {
    pub fn new(router: R, stats: TaskStats) -> Self {
        let supervisor = TaskSupervisor::new(router.tier(), stats);
        Self { router, supervisor }
    }

    /// Route items until the channel closes. Handlers still running at that
    /// point are left to finish on their own.
    pub async fn run(self, mut inbound: mpsc::Receiver<R::Item>) {
        let tier = self.router.tier();
        info!("[{tier}] Listening");

        while let Some(item) = inbound.recv().await {
            if let Some(dispatch) = self.router.route(item) {
                self.supervisor.spawn(dispatch.label, dispatch.task);
            }
        }

        info!("[{tier}] Inbound channel closed, loop stopped");
    }

    pub fn spawn(self, inbound: mpsc::Receiver<R::Item>) -> JoinHandle<()> {
        tokio::spawn(self.run(inbound))
    }
}
