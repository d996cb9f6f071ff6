//! Trigger-form command definitions
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Reject argument patterns that do not compile
//! - 1.0.0: Triggers, regex arguments, permission and exposure levels

use serde::{Deserialize, Serialize};

use crate::core::ValidationError;
use crate::features::matching::arguments::ArgumentPattern;

/// Minimum authority needed to run a command.
///
/// Ordered from most to least restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Owner,
    Admin,
    Moderator,
    #[default]
    User,
}

/// Where a command may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureLevel {
    #[default]
    Everywhere,
    PublicOnly,
    PrivateOnly,
}

/// One positional argument parsed out of the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandArgument {
    /// Regex fragment matched against this argument's text
    pub pattern: String,
    /// Key of the captured value in the payload's argument map
    pub alias: String,
    #[serde(default)]
    pub optional: bool,
}

impl CommandArgument {
    pub fn required(alias: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            alias: alias.into(),
            optional: false,
        }
    }

    pub fn optional(alias: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::required(alias, pattern)
        }
    }

    fn validate(&self, command_id: &str, index: usize) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.pattern.is_empty() {
            errors.push(ValidationError::MissingArgumentPattern {
                command_id: command_id.to_string(),
                index,
            });
        }
        if self.alias.is_empty() {
            errors.push(ValidationError::MissingArgumentAlias {
                command_id: command_id.to_string(),
                index,
            });
        }
        errors
    }
}

/// A command invoked by a prefixed trigger word or a bot mention.
///
/// ```ignore
/// let roll = CommandDefinition::new("roll")
///     .description("Roll some dice")
///     .trigger("roll")
///     .trigger("r")
///     .argument(CommandArgument::required("dice", r"\d+d\d+"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub command_id: String,
    #[serde(default)]
    pub description: String,
    /// The first trigger is the one shown in help text.
    pub triggers: Vec<String>,
    #[serde(default)]
    pub arguments: Vec<CommandArgument>,
    #[serde(default)]
    pub permission_level: PermissionLevel,
    #[serde(default)]
    pub exposure_level: ExposureLevel,
    #[serde(default)]
    pub unlisted: bool,
    #[serde(default)]
    pub disable_trigger_on_mention: bool,
}

impl CommandDefinition {
    pub fn new(command_id: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn trigger(mut self, trigger: impl Into<String>) -> Self {
        self.triggers.push(trigger.into());
        self
    }

    pub fn argument(mut self, argument: CommandArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn permission(mut self, level: PermissionLevel) -> Self {
        self.permission_level = level;
        self
    }

    pub fn exposure(mut self, level: ExposureLevel) -> Self {
        self.exposure_level = level;
        self
    }

    pub fn unlisted(mut self) -> Self {
        self.unlisted = true;
        self
    }

    pub fn no_mention_trigger(mut self) -> Self {
        self.disable_trigger_on_mention = true;
        self
    }

    /// Check the definition without side effects.
    ///
    /// Reports every problem found; the pattern compile check only runs once
    /// every argument has a pattern and an alias.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.command_id.is_empty() {
            errors.push(ValidationError::MissingCommandId);
        }
        if self.triggers.is_empty() {
            errors.push(ValidationError::MissingTriggers {
                command_id: self.command_id.clone(),
            });
        }

        let argument_errors: Vec<_> = self
            .arguments
            .iter()
            .enumerate()
            .flat_map(|(index, argument)| argument.validate(&self.command_id, index))
            .collect();

        if argument_errors.is_empty() {
            if let Err(e) = ArgumentPattern::compile(&self.arguments) {
                errors.push(ValidationError::InvalidArgumentPattern {
                    command_id: self.command_id.clone(),
                    reason: e.to_string(),
                });
            }
        }
        errors.extend(argument_errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Help line for the canonical trigger, e.g. ``"`!roll <dice>` - Roll some dice"``.
    pub fn help_line(&self, command_prefix: &str) -> String {
        let trigger = self.triggers.first().map(String::as_str).unwrap_or_default();
        let aliases: Vec<&str> = self.arguments.iter().map(|a| a.alias.as_str()).collect();
        command_help(trigger, &aliases, &self.description, command_prefix)
    }
}

/// Format one help line. Public so plugins with custom help stay consistent.
pub fn command_help(
    command: &str,
    arguments: &[&str],
    description: &str,
    command_prefix: &str,
) -> String {
    let mut usage = format!("{command_prefix}{command}");
    for argument in arguments {
        usage.push_str(&format!(" <{argument}>"));
    }
    format!("`{usage}` - {description}")
}
