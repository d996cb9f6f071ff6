//! Process configuration loaded from the environment
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Result};

pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Settings for the `bot` binary.
///
/// Read with [`Config::from_env`] after `dotenvy::dotenv()` has populated the
/// environment from an optional `.env` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    /// Falls back to the application owner reported by Discord when unset.
    pub owner_user_id: Option<String>,
    /// Falls back to the application id reported by Discord when unset.
    pub client_id: Option<String>,
    pub log_level: String,
    /// Bound of both the inbound message queue and the work queue.
    pub queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token =
            get("DISCORD_TOKEN").ok_or_else(|| anyhow!("DISCORD_TOKEN must be set"))?;

        let queue_capacity = match get("QUEUE_CAPACITY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow!("QUEUE_CAPACITY must be a positive integer, got '{raw}'"))?,
            None => DEFAULT_QUEUE_CAPACITY,
        };

        Ok(Self {
            discord_token,
            command_prefix: get("COMMAND_PREFIX")
                .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string()),
            owner_user_id: get("OWNER_USER_ID"),
            client_id: get("CLIENT_ID"),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            queue_capacity,
        })
    }

    /// The subset of settings the local dispatcher needs.
    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig::new(self.command_prefix.clone())
    }
}

/// Engine-facing settings for the local dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Prepended to every trigger, e.g. `!` for `!ping`.
    pub command_prefix: String,
}

impl ListenerConfig {
    pub fn new(command_prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: command_prefix.into(),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_PREFIX)
    }
}
