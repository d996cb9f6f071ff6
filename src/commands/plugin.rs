//! Plugin traits for the two dispatch tiers
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::fmt;
use std::sync::Arc;

use crate::core::ValidationError;
use crate::source::Message;

use super::definition::CommandDefinition;
use super::handler::PayloadHandler;
use super::registry::NamedPlugin;

/// What a plugin's help renderer gets to look at.
pub struct HelpRequest<'a> {
    pub command_prefix: &'a str,
    pub message: &'a dyn Message,
}

/// A bundle of trigger-form commands for the local dispatcher.
pub trait ListenerPlugin: NamedPlugin {
    /// Read once when the dispatcher opens.
    fn commands(&self) -> Vec<CommandDefinition>;

    /// Custom help lines. `None` lists every command that is not unlisted.
    fn help(&self, _request: &HelpRequest<'_>) -> Option<Vec<String>> {
        None
    }
}

/// A payload-form command: an identifier and the handler that runs it.
#[derive(Clone)]
pub struct ProcessCommand {
    pub command_id: String,
    pub handler: Arc<dyn PayloadHandler>,
}

impl ProcessCommand {
    pub fn new(command_id: impl Into<String>, handler: Arc<dyn PayloadHandler>) -> Self {
        Self {
            command_id: command_id.into(),
            handler,
        }
    }

    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        if self.command_id.is_empty() {
            Err(vec![ValidationError::MissingCommandId])
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessCommand")
            .field("command_id", &self.command_id)
            .finish_non_exhaustive()
    }
}

/// A bundle of payload-form commands for the payload dispatcher.
pub trait ProcessorPlugin: NamedPlugin {
    /// Read once when the dispatcher opens.
    fn commands(&self) -> Vec<ProcessCommand>;
}
