//! Engine-level commands shipped with the bot
//!
//! The listener side only knows the trigger form; the processor side holds
//! the handlers. Both halves share the command ids below.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

pub mod invite;
pub mod stats;

use std::sync::Arc;

use super::definition::CommandDefinition;
use super::plugin::ProcessCommand;
use crate::features::dispatch::TaskStats;

pub use invite::InviteHandler;
pub use stats::StatsHandler;

pub const INVITE: &str = "invite";
pub const STATS: &str = "stats";

pub fn listener_commands() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(INVITE)
            .description("Get a link to add the bot to your server")
            .trigger("invite"),
        CommandDefinition::new(STATS)
            .description("Show uptime, memory and task counts")
            .trigger("stats"),
    ]
}

/// Handlers for [`listener_commands`]. Pass the listener's stats to have
/// `stats` report on it too.
pub fn processor_commands(listener_stats: Option<TaskStats>) -> Vec<ProcessCommand> {
    vec![
        ProcessCommand::new(INVITE, Arc::new(InviteHandler)),
        ProcessCommand::new(STATS, Arc::new(StatsHandler::new(listener_stats))),
    ]
}
