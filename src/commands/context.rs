//! Shared context for command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::features::dispatch::supervisor::TaskStats;
use crate::source::MessageSource;

use super::payload::CommandPayload;

/// Services every handler can reach.
///
/// One context exists per dispatcher; handlers receive it behind an `Arc`.
#[derive(Clone)]
pub struct CommandContext {
    pub source: Arc<dyn MessageSource>,
    /// Counters of the dispatcher that spawned the handler.
    pub tasks: TaskStats,
    pub start_time: Instant,
}

impl CommandContext {
    pub fn new(source: Arc<dyn MessageSource>, tasks: TaskStats) -> Self {
        Self {
            source,
            tasks,
            start_time: Instant::now(),
        }
    }

    /// Send `text` to the channel the payload came from.
    pub async fn reply(&self, payload: &CommandPayload, text: &str) -> Result<()> {
        self.source.send_message(payload.channel_id(), text).await
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
