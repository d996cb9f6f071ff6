//! Command listing for `commands` requests
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Plugins may replace their listed lines with custom help
//! - 1.0.0: Sorted, de-duplicated listing of every listed command

use crate::commands::definition::CommandDefinition;
use crate::commands::plugin::{HelpRequest, ListenerPlugin};
use crate::source::Message;

pub const NO_COMMANDS: &str = "No commands found";

/// Commands contributed by one plugin, or by the engine when `plugin` is
/// `None`.
pub struct HelpSection<'a> {
    pub plugin: Option<&'a dyn ListenerPlugin>,
    pub commands: Vec<&'a CommandDefinition>,
}

/// Collect help lines from every section.
///
/// A plugin's custom help replaces the lines of its own commands. The result
/// is sorted and free of duplicates, and never empty.
pub fn compose_help(
    command_prefix: &str,
    sections: &[HelpSection<'_>],
    message: &dyn Message,
) -> Vec<String> {
    let request = HelpRequest {
        command_prefix,
        message,
    };

    let mut lines: Vec<String> = Vec::new();
    for section in sections {
        let custom = section.plugin.and_then(|plugin| plugin.help(&request));
        match custom {
            Some(custom) => lines.extend(custom),
            None => lines.extend(
                section
                    .commands
                    .iter()
                    .filter(|command| !command.unlisted)
                    .map(|command| command.help_line(command_prefix)),
            ),
        }
    }

    lines.sort();
    lines.dedup();
    if lines.is_empty() {
        lines.push(NO_COMMANDS.to_string());
    }
    lines
}

pub fn render_help(lines: &[String]) -> String {
    lines.join("\n")
}
