//! Message source backed by a serenity client
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::guild::Guild;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::model::permissions::Permissions;
use std::sync::Arc;

use crate::core::chunk_for_message;
use crate::source::{Capabilities, Message, MessageSource};

/// Identity of the connected bot, resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct BotIdentity {
    pub user_id: String,
    pub user_name: String,
    pub client_id: Option<String>,
    pub owner_user_id: Option<String>,
}

/// Answers capability tests from the serenity cache and sends replies over
/// HTTP.
///
/// Moderator checks need the author's member entry in the cache, which
/// requires the `GUILD_MEMBERS` intent.
pub struct DiscordClient {
    http: Arc<Http>,
    cache: Arc<Cache>,
    identity: BotIdentity,
}

impl DiscordClient {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>, identity: BotIdentity) -> Self {
        Self {
            http,
            cache,
            identity,
        }
    }

    pub fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }

    fn guild_of(&self, message: &dyn Message) -> Option<Guild> {
        let id = message.guild_id()?.parse::<u64>().ok()?;
        self.cache.guild(GuildId(id))
    }
}

/// Rights that make a member a moderator.
fn grants_moderation(permissions: Permissions) -> bool {
    permissions.administrator() || permissions.manage_channels() || permissions.manage_guild()
}

impl Capabilities for DiscordClient {
    fn is_private(&self, message: &dyn Message) -> bool {
        message.guild_id().is_none()
    }

    /// Administrator, manage-channels or manage-server rights in the message's
    /// channel, or ownership of the guild.
    fn is_moderator(&self, message: &dyn Message) -> bool {
        let privileged = self.guild_of(message).and_then(|guild| {
            let channel_id = ChannelId(message.channel_id().parse::<u64>().ok()?);
            let channel = guild.channels.get(&channel_id)?.clone().guild()?;
            let user = UserId(message.author_id().parse::<u64>().ok()?);
            let member = guild.members.get(&user)?;
            let permissions = guild.user_permissions_in(&channel, member).ok()?;
            Some(grants_moderation(permissions))
        });

        privileged.unwrap_or(false) || self.is_context_owner(message)
    }

    fn is_context_owner(&self, message: &dyn Message) -> bool {
        let owns_guild = self
            .guild_of(message)
            .map(|guild| guild.owner_id.to_string() == message.author_id())
            .unwrap_or(false);

        owns_guild || self.is_bot_owner(message)
    }

    fn is_bot_owner(&self, message: &dyn Message) -> bool {
        self.identity.owner_user_id.as_deref() == Some(message.author_id())
    }
}

#[async_trait]
impl MessageSource for DiscordClient {
    fn bot_user_id(&self) -> &str {
        &self.identity.user_id
    }

    fn bot_user_name(&self) -> &str {
        &self.identity.user_name
    }

    fn client_id(&self) -> Option<&str> {
        self.identity.client_id.as_deref()
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<()> {
        let channel = ChannelId(
            channel_id
                .parse::<u64>()
                .with_context(|| format!("Invalid channel id '{channel_id}'"))?,
        );
        let http: &Http = &self.http;

        for chunk in chunk_for_message(text) {
            channel
                .say(http, chunk)
                .await
                .with_context(|| format!("Failed to send message to {channel_id}"))?;
        }
        Ok(())
    }
}
