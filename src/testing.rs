//! In-memory fakes for the platform traits, shared by unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::source::{mention, Capabilities, Message, MessageRef, MessageSource};

pub const BOT_ID: &str = "999";
pub const BOT_NAME: &str = "Cyto";
pub const OWNER_ID: &str = "owner";

#[derive(Debug, Clone)]
pub struct FakeMessage {
    pub id: String,
    pub raw: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub author_id: String,
    pub author_name: String,
}

impl FakeMessage {
    pub fn in_guild(raw: &str, channel_id: &str, guild_id: &str, author_id: &str) -> Self {
        Self {
            id: "m1".into(),
            raw: raw.into(),
            channel_id: channel_id.into(),
            guild_id: Some(guild_id.into()),
            author_id: author_id.into(),
            author_name: format!("name-{author_id}"),
        }
    }

    pub fn direct(raw: &str, author_id: &str) -> Self {
        Self {
            id: "m1".into(),
            raw: raw.into(),
            channel_id: format!("dm-{author_id}"),
            guild_id: None,
            author_id: author_id.into(),
            author_name: format!("name-{author_id}"),
        }
    }

    /// Public message in `#general` of guild `g1`.
    pub fn public(raw: &str, author_id: &str) -> Self {
        Self::in_guild(raw, "general", "g1", author_id)
    }

    pub fn arc(self) -> MessageRef {
        Arc::new(self)
    }
}

impl Message for FakeMessage {
    fn id(&self) -> &str {
        &self.id
    }

    fn raw_text(&self) -> &str {
        &self.raw
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
        mention::starts_with_mention(&self.raw, BOT_ID)
    }

    fn mention_trigger(&self, word: &str) -> Option<String> {
        mention::mention_trigger(&self.raw, BOT_ID, word)
    }
}

/// Records replies and answers capability tests from fixed tables.
#[derive(Debug, Default)]
pub struct FakeSource {
    pub client_id: Option<String>,
    pub moderators: HashSet<String>,
    /// guild id -> owner user id
    pub guild_owners: HashMap<String, String>,
    pub fail_sends: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            client_id: Some("12345".into()),
            ..Default::default()
        }
    }

    pub fn with_moderator(mut self, user_id: &str) -> Self {
        self.moderators.insert(user_id.into());
        self
    }

    pub fn with_guild_owner(mut self, guild_id: &str, user_id: &str) -> Self {
        self.guild_owners.insert(guild_id.into(), user_id.into());
        self
    }

    pub fn without_client_id(mut self) -> Self {
        self.client_id = None;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Poll until at least `count` replies were sent or a second elapses.
    pub async fn wait_for_replies(&self, count: usize) -> Vec<(String, String)> {
        for _ in 0..100 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent()
    }
}

impl Capabilities for FakeSource {
    fn is_private(&self, message: &dyn Message) -> bool {
        message.guild_id().is_none()
    }

    fn is_moderator(&self, message: &dyn Message) -> bool {
        self.moderators.contains(message.author_id())
    }

    fn is_context_owner(&self, message: &dyn Message) -> bool {
        message
            .guild_id()
            .and_then(|guild| self.guild_owners.get(guild))
            .map(|owner| owner == message.author_id())
            .unwrap_or(false)
    }

    fn is_bot_owner(&self, message: &dyn Message) -> bool {
        message.author_id() == OWNER_ID
    }
}

#[async_trait]
impl MessageSource for FakeSource {
    fn bot_user_id(&self) -> &str {
        BOT_ID
    }

    fn bot_user_name(&self) -> &str {
        BOT_NAME
    }

    fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<()> {
        if self.fail_sends {
            return Err(anyhow!("send refused"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }
}
