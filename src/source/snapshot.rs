//! Owned, serializable copy of a [`Message`]
//!
//! Used when a matched payload leaves the process: the remote tier only
//! needs identity and text to reply, never mention data.

use serde::{Deserialize, Serialize};

use super::Message;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    pub id: String,
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub raw_text: String,
    pub text: String,
}

impl MessageSnapshot {
    pub fn capture(message: &dyn Message) -> Self {
        Self {
            id: message.id().to_string(),
            channel_id: message.channel_id().to_string(),
            guild_id: message.guild_id().map(str::to_string),
            author_id: message.author_id().to_string(),
            author_name: message.author_name().to_string(),
            raw_text: message.raw_text().to_string(),
            text: message.text().to_string(),
        }
    }
}

impl Message for MessageSnapshot {
    fn id(&self) -> &str {
        &self.id
    }

    fn raw_text(&self) -> &str {
        &self.raw_text
    }

    fn text(&self) -> &str {
        &self.text
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
        false
    }

    fn mention_trigger(&self, _word: &str) -> Option<String> {
        None
    }
}
