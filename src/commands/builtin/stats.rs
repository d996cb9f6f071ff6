//! `stats`: uptime, memory and handler counters
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Report the listener tier next to the processor tier
//! - 1.0.0: Uptime, process memory and task counts

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

use crate::commands::context::CommandContext;
use crate::commands::handler::PayloadHandler;
use crate::commands::payload::CommandPayload;
use crate::core::code_block;
use crate::features::dispatch::TaskStats;

/// Format a duration as `HH:MM:SS`; hours keep growing past a day.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Format bytes into human-readable string (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Resident memory of this process, if the platform reports it.
fn process_memory() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::new().with_memory(),
    );
    sys.process(pid).map(|p| p.memory())
}

fn tier_block(title: &str, stats: &TaskStats) -> String {
    let body = format!(
        "{:<18}{}\n{:<18}{}\n{:<18}{}",
        "Concurrent tasks:",
        stats.in_flight(),
        "Dispatched:",
        stats.spawned(),
        "Failed:",
        stats.failed()
    );
    format!("{title}:\n{}", code_block(&body))
}

pub fn render_stats(
    uptime: Duration,
    memory: Option<u64>,
    listener: Option<&TaskStats>,
    processor: &TaskStats,
) -> String {
    let memory = memory.map(format_bytes).unwrap_or_else(|| "unknown".to_string());
    let summary = format!(
        "{:<18}{}\n{:<18}{}",
        "Uptime:",
        format_uptime(uptime),
        "Memory used:",
        memory
    );

    let mut out = code_block(&summary);
    if let Some(listener) = listener {
        out.push('\n');
        out.push_str(&tier_block("Listener", listener));
    }
    out.push('\n');
    out.push_str(&tier_block("Processor", processor));
    out
}

/// Reports on the processor it runs in, and on the listener when one is
/// attached.
#[derive(Default)]
pub struct StatsHandler {
    listener: Option<TaskStats>,
}

impl StatsHandler {
    pub fn new(listener: Option<TaskStats>) -> Self {
        Self { listener }
    }
}

#[async_trait]
impl PayloadHandler for StatsHandler {
    async fn process(&self, ctx: Arc<CommandContext>, payload: CommandPayload) -> Result<()> {
        let text = render_stats(
            ctx.uptime(),
            process_memory(),
            self.listener.as_ref(),
            &ctx.tasks,
        );
        ctx.reply(&payload, &text).await
    }
}
