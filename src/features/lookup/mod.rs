//! # Feature: Remote Lookup
//!
//! Resolves channel, guild and user metadata for a process that has no
//! gateway connection of its own. Requests go to the listener owning the
//! given source over a request/response bus.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: String,
    pub guild_id: String,
    pub name: String,
    pub topic: String,
    pub last_message_id: String,
    pub nsfw: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildInfo {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub owner_id: String,
    pub joined_at: String,
    pub member_count: i64,
    pub embed_enabled: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub avatar: String,
}

/// Entity metadata resolved through the process owning `source_id`.
#[async_trait]
pub trait RemoteLookup: Send + Sync {
    async fn resolve_channel(&self, source_id: &str, channel_id: &str) -> Result<ChannelInfo>;

    async fn resolve_guild(&self, source_id: &str, guild_id: &str) -> Result<GuildInfo>;

    async fn resolve_user(&self, source_id: &str, user_id: &str, channel_id: &str)
        -> Result<UserInfo>;
}

/// Request/response transport addressed by subject.
#[async_trait]
pub trait RequestBus: Send + Sync {
    async fn request(&self, subject: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InformationRequest {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub request_type: String,
    pub payload: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InformationResponse {
    #[serde(default)]
    pub payload: HashMap<String, String>,
}

/// [`RemoteLookup`] over a [`RequestBus`], using JSON bodies.
///
/// Response fields are read leniently: missing keys become empty strings and
/// unparsable numbers or flags fall back to their defaults.
pub struct BusLookup {
    bus: Arc<dyn RequestBus>,
    timeout: Duration,
}

impl BusLookup {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(bus: Arc<dyn RequestBus>) -> Self {
        Self {
            bus,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send_request(
        &self,
        source_id: &str,
        request_type: &str,
        payload: &[(&str, &str)],
    ) -> Result<Fields> {
        let request = InformationRequest {
            timestamp: Utc::now(),
            request_type: request_type.to_string(),
            payload: payload
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        let body = serde_json::to_vec(&request)?;

        debug!("Resolving {request_type} through '{source_id}'");
        let reply = tokio::time::timeout(self.timeout, self.bus.request(source_id, body))
            .await
            .map_err(|_| anyhow!("{request_type} lookup through '{source_id}' timed out"))?
            .with_context(|| format!("{request_type} lookup through '{source_id}' failed"))?;

        let response: InformationResponse = serde_json::from_slice(&reply).unwrap_or_else(|e| {
            warn!("Unreadable {request_type} lookup response: {e}");
            InformationResponse::default()
        });
        Ok(Fields(response.payload))
    }
}

struct Fields(HashMap<String, String>);

impl Fields {
    fn text(&self, key: &str) -> String {
        self.0.get(key).cloned().unwrap_or_default()
    }

    fn parsed<T: FromStr + Default>(&self, key: &str) -> T {
        self.0
            .get(key)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(|value| parse_flag(value)).unwrap_or(false)
    }
}

/// Boolean spellings accepted from the resolving side.
fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[async_trait]
impl RemoteLookup for BusLookup {
    async fn resolve_channel(&self, source_id: &str, channel_id: &str) -> Result<ChannelInfo> {
        let fields = self
            .send_request(source_id, "channel", &[("channelID", channel_id)])
            .await?;

        Ok(ChannelInfo {
            id: fields.text("ID"),
            guild_id: fields.text("GuildID"),
            name: fields.text("Name"),
            topic: fields.text("Topic"),
            last_message_id: fields.text("LastMessageId"),
            nsfw: fields.flag("NSFW"),
        })
    }

    async fn resolve_guild(&self, source_id: &str, guild_id: &str) -> Result<GuildInfo> {
        let fields = self
            .send_request(source_id, "guild", &[("guildID", guild_id)])
            .await?;

        Ok(GuildInfo {
            id: fields.text("ID"),
            name: fields.text("Name"),
            icon: fields.text("Icon"),
            owner_id: fields.text("OwnerID"),
            joined_at: fields.text("JoinedAt"),
            member_count: fields.parsed("MemberCount"),
            embed_enabled: fields.flag("EmbedEnabled"),
            description: fields.text("Description"),
        })
    }

    async fn resolve_user(
        &self,
        source_id: &str,
        user_id: &str,
        channel_id: &str,
    ) -> Result<UserInfo> {
        let fields = self
            .send_request(
                source_id,
                "user",
                &[("userID", user_id), ("channelID", channel_id)],
            )
            .await?;

        Ok(UserInfo {
            id: fields.text("ID"),
            username: fields.text("Username"),
            avatar: fields.text("Avatar"),
        })
    }
}
