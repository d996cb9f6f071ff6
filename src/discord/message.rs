//! Inbound Discord message as seen by the engine

use serenity::cache::Cache;
use serenity::model::channel::Message as SerenityMessage;

use crate::source::{mention, Message};

/// Owned copy of the fields the engine reads from a gateway message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordMessage {
    pub id: String,
    pub raw: String,
    /// Content with mentions resolved to names.
    pub display: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub author_id: String,
    pub author_name: String,
    /// Mentions of this user count as addressing the bot.
    pub bot_user_id: String,
}

impl DiscordMessage {
    pub fn from_gateway(message: &SerenityMessage, cache: &Cache, bot_user_id: &str) -> Self {
        Self {
            id: message.id.to_string(),
            raw: message.content.clone(),
            display: message.content_safe(cache),
            channel_id: message.channel_id.to_string(),
            guild_id: message.guild_id.map(|id| id.to_string()),
            author_id: message.author.id.to_string(),
            author_name: message.author.name.clone(),
            bot_user_id: bot_user_id.to_string(),
        }
    }
}

impl Message for DiscordMessage {
    fn id(&self) -> &str {
        &self.id
    }

    fn raw_text(&self) -> &str {
        &self.raw
    }

    fn text(&self) -> &str {
        &self.display
    }

    fn channel_id(&self) -> &str {
        &self.channel_id
    }

    fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref()
    }

    fn author_id(&self) -> &str {
        &self.author_id
    }

    fn author_name(&self) -> &str {
        &self.author_name
    }

    fn mentions_bot(&self) -> bool {
        mention::starts_with_mention(&self.raw, &self.bot_user_id)
    }

    fn mention_trigger(&self, word: &str) -> Option<String> {
        mention::mention_trigger(&self.raw, &self.bot_user_id, word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(raw: &str) -> DiscordMessage {
        DiscordMessage {
            id: "1".into(),
            raw: raw.into(),
            display: raw.into(),
            channel_id: "2".into(),
            guild_id: Some("3".into()),
            author_id: "4".into(),
            author_name: "alice".into(),
            bot_user_id: "900".into(),
        }
    }

    #[test]
    fn test_mentions_use_bot_id() {
        assert!(message("<@900> ping").mentions_bot());
        assert!(message("<@!900> ping").mentions_bot());
        assert!(!message("<@901> ping").mentions_bot());
        assert_eq!(
            message("<@!900> ping now").mention_trigger("ping"),
            Some("<@!900> ping".to_string())
        );
    }

    #[test]
    fn test_display_text_separate_from_raw() {
        let mut msg = message("<@4> hi");
        msg.display = "@alice hi".into();
        assert_eq!(msg.raw_text(), "<@4> hi");
        assert_eq!(msg.text(), "@alice hi");
    }
}
