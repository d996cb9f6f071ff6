// Core layer - configuration, startup errors, reply formatting
pub mod core;

// Platform traits the engine consumes
pub mod source;

// Command model and plugin registry
pub mod commands;

// Features layer - matching, dispatch, queue, lookup
pub mod features;

// Serenity-backed message source
pub mod discord;

#[cfg(test)]
mod testing;

pub use crate::core::{Config, ListenerConfig, StartupError};
pub use commands::{
    CommandArgument, CommandCallback, CommandContext, CommandDefinition, CommandPayload,
    ExposureLevel, ListenerPlugin, PayloadHandler, PermissionLevel, ProcessCommand,
    ProcessorPlugin,
};
pub use features::{Listener, Processor};
pub use source::{Capabilities, Message, MessageRef, MessageSource};
