//! # Command System
//!
//! Command definitions, payloads, handler traits and the plugin registry
//! shared by both dispatch tiers.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Trigger-form and payload-form commands grouped into plugins
//! - 2.0.0: Engine-level `invite` and `stats` commands
//! - 1.0.0: Handler trait, context and registry

pub mod builtin;
pub mod context;
pub mod definition;
pub mod handler;
pub mod payload;
pub mod plugin;
pub mod registry;

pub use context::CommandContext;
pub use definition::{
    command_help, CommandArgument, CommandDefinition, ExposureLevel, PermissionLevel,
};
pub use handler::{CommandCallback, PayloadHandler};
pub use payload::CommandPayload;
pub use plugin::{HelpRequest, ListenerPlugin, ProcessCommand, ProcessorPlugin};
pub use registry::{NamedPlugin, PluginRegistry};
