//! # Message Source
//!
//! Traits the engine consumes from the chat platform: inbound messages, the
//! capability tests the access gate needs, and the reply operation.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod mention;
pub mod snapshot;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

pub use snapshot::MessageSnapshot;

/// One inbound chat message.
pub trait Message: Debug + Send + Sync {
    fn id(&self) -> &str;

    /// Unprocessed text as the user typed it.
    fn raw_text(&self) -> &str;

    /// Text prepared for display. Defaults to the raw text.
    fn text(&self) -> &str {
        self.raw_text()
    }

    fn channel_id(&self) -> &str;

    /// `None` for direct messages.
    fn guild_id(&self) -> Option<&str>;

    fn author_id(&self) -> &str;

    fn author_name(&self) -> &str;

    /// Whether the message opens by addressing the bot.
    fn mentions_bot(&self) -> bool;

    /// Test for a mention-style invocation of `word`.
    ///
    /// Returns the raw text consumed by the invocation (the mention and the
    /// word) so it can be stripped before argument extraction.
    fn mention_trigger(&self, word: &str) -> Option<String>;
}

pub type MessageRef = Arc<dyn Message>;

/// Facts about a message's author and origin, answered by the platform.
pub trait Capabilities {
    /// Sent in a one-to-one context.
    fn is_private(&self, message: &dyn Message) -> bool;

    /// Author holds moderator-equivalent rights where the message was sent.
    fn is_moderator(&self, message: &dyn Message) -> bool;

    /// Author owns the context (guild) the message was sent in.
    fn is_context_owner(&self, message: &dyn Message) -> bool;

    /// Author is the configured owner of the bot.
    fn is_bot_owner(&self, message: &dyn Message) -> bool;
}

#[async_trait]
pub trait MessageSource: Capabilities + Send + Sync {
    fn bot_user_id(&self) -> &str;

    fn bot_user_name(&self) -> &str;

    /// OAuth client id, when known.
    fn client_id(&self) -> Option<&str>;

    fn is_me(&self, message: &dyn Message) -> bool {
        message.author_id() == self.bot_user_id()
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<()>;
}
