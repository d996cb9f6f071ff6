//! Trigger matching
//!
//! A trigger fires on the literal token `prefix + trigger` at the start of
//! the message, or on a mention of the bot followed by the trigger word.

use crate::commands::definition::CommandDefinition;
use crate::source::Message;

/// Test one trigger of `definition` against a message.
///
/// `parts` is the raw text split on whitespace. Returns the matched text to
/// strip before argument extraction.
pub fn find_trigger_match(
    definition: &CommandDefinition,
    trigger: &str,
    command_prefix: &str,
    parts: &[&str],
    message: &dyn Message,
) -> Option<String> {
    let first = parts.first()?;

    if first.strip_prefix(command_prefix) == Some(trigger) {
        return Some(first.to_string());
    }

    if !definition.disable_trigger_on_mention && parts.len() > 1 {
        return message.mention_trigger(trigger);
    }

    None
}

/// The first trigger of `definition` that fires, in declaration order.
///
/// Returns `(trigger, matched_text)`.
pub fn first_trigger_match(
    definition: &CommandDefinition,
    command_prefix: &str,
    parts: &[&str],
    message: &dyn Message,
) -> Option<(String, String)> {
    definition.triggers.iter().find_map(|trigger| {
        find_trigger_match(definition, trigger, command_prefix, parts, message)
            .map(|matched| (trigger.clone(), matched))
    })
}

/// A request for the command listing: `prefix + "commands"` or a mention.
pub fn is_commands_request(command_prefix: &str, message: &dyn Message) -> bool {
    const TRIGGER_TERM: &str = "commands";

    message.mention_trigger(TRIGGER_TERM).is_some()
        || message
            .raw_text()
            .starts_with(&format!("{command_prefix}{TRIGGER_TERM}"))
}
