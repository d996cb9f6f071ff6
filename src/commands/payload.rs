//! The record handed to a handler once a command matched

use std::collections::HashMap;

use crate::source::MessageRef;

/// A matched command.
///
/// Built once per match and moved into exactly one handler. `trigger` is
/// empty when the payload was reconstructed without trigger information.
#[derive(Debug)]
pub struct CommandPayload {
    pub command_id: String,
    /// The trigger word that fired, without prefix.
    pub trigger: String,
    /// Argument alias -> captured text.
    pub arguments: HashMap<String, String>,
    pub message: MessageRef,
}

impl CommandPayload {
    pub fn new(
        command_id: impl Into<String>,
        trigger: impl Into<String>,
        arguments: HashMap<String, String>,
        message: MessageRef,
    ) -> Self {
        Self {
            command_id: command_id.into(),
            trigger: trigger.into(),
            arguments,
            message,
        }
    }

    /// Captured value for `alias`; `None` for unknown aliases, `Some("")` for
    /// an omitted optional argument.
    pub fn argument(&self, alias: &str) -> Option<&str> {
        self.arguments.get(alias).map(String::as_str)
    }

    pub fn channel_id(&self) -> &str {
        self.message.channel_id()
    }
}
