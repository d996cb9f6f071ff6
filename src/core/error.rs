//! Typed errors raised while validating registries at startup
//!
//! Runtime failures (handlers, transport) use `anyhow`; these types only
//! describe misconfiguration, which is fatal to `open()` but never to a
//! running loop.

use std::fmt;
use thiserror::Error;

/// One problem with a plugin or command definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no command id provided for command definition")]
    MissingCommandId,

    #[error("no triggers provided for command '{command_id}'")]
    MissingTriggers { command_id: String },

    #[error("no regex pattern provided for argument #{index} of command '{command_id}'")]
    MissingArgumentPattern { command_id: String, index: usize },

    #[error("no alias provided for argument #{index} of command '{command_id}'")]
    MissingArgumentAlias { command_id: String, index: usize },

    #[error("argument pattern of command '{command_id}' does not compile: {reason}")]
    InvalidArgumentPattern { command_id: String, reason: String },

    #[error("plugin is missing a name")]
    MissingPluginName,
}

/// Where a validation error was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Plugin(String),
    Engine,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Plugin(name) if name.is_empty() => write!(f, "plugin <unnamed>"),
            Scope::Plugin(name) => write!(f, "plugin '{name}'"),
            Scope::Engine => write!(f, "engine command"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{scope}: {error}")]
pub struct Misconfiguration {
    pub scope: Scope,
    pub error: ValidationError,
}

impl Misconfiguration {
    pub fn new(scope: Scope, error: ValidationError) -> Self {
        Self { scope, error }
    }
}

/// A dispatcher refused to start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{} misconfigured plugin(s) or command(s) found", .0.len())]
    Misconfigured(Vec<Misconfiguration>),
}

impl StartupError {
    pub fn problems(&self) -> &[Misconfiguration] {
        match self {
            StartupError::Misconfigured(problems) => problems,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misconfiguration_display() {
        let problem = Misconfiguration::new(
            Scope::Plugin("music".into()),
            ValidationError::MissingTriggers {
                command_id: "play".into(),
            },
        );
        assert_eq!(
            problem.to_string(),
            "plugin 'music': no triggers provided for command 'play'"
        );

        let unnamed = Misconfiguration::new(Scope::Plugin(String::new()), ValidationError::MissingPluginName);
        assert_eq!(unnamed.to_string(), "plugin <unnamed>: plugin is missing a name");
    }

    #[test]
    fn test_startup_error_counts_problems() {
        let err = StartupError::Misconfigured(vec![
            Misconfiguration::new(Scope::Engine, ValidationError::MissingCommandId),
            Misconfiguration::new(Scope::Engine, ValidationError::MissingCommandId),
        ]);
        assert_eq!(err.problems().len(), 2);
        assert!(err.to_string().starts_with("2 misconfigured"));
    }
}
