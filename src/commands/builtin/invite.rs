//! `invite`: OAuth link for adding the bot to a server
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::PayloadHandler;
use crate::commands::payload::CommandPayload;

pub fn invite_url(client_id: &str) -> String {
    format!("https://discord.com/oauth2/authorize?client_id={client_id}&scope=bot")
}

pub fn invite_message(client_id: &str, bot_name: &str) -> String {
    format!(
        "Please visit <{}> to add {bot_name} to your server.",
        invite_url(client_id)
    )
}

/// Stays silent when the source has no client id.
pub struct InviteHandler;

#[async_trait]
impl PayloadHandler for InviteHandler {
    async fn process(&self, ctx: Arc<CommandContext>, payload: CommandPayload) -> Result<()> {
        let Some(client_id) = ctx.source.client_id() else {
            debug!("No client id known, invite request ignored");
            return Ok(());
        };

        let message = invite_message(client_id, ctx.source.bot_user_name());
        ctx.reply(&payload, &message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::dispatch::TaskStats;
    use crate::testing::{FakeMessage, FakeSource};
    use std::collections::HashMap;

    fn payload() -> CommandPayload {
        CommandPayload::new(
            "invite",
            "invite",
            HashMap::new(),
            FakeMessage::public("!invite", "u1").arc(),
        )
    }

    #[test]
    fn test_invite_message() {
        assert_eq!(
            invite_message("42", "Cyto"),
            "Please visit <https://discord.com/oauth2/authorize?client_id=42&scope=bot> to add Cyto to your server."
        );
    }

    #[tokio::test]
    async fn test_replies_with_link() {
        let source = Arc::new(FakeSource::new());
        let ctx = Arc::new(CommandContext::new(source.clone(), TaskStats::default()));

        InviteHandler.process(ctx, payload()).await.unwrap();

        let sent = source.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("client_id=12345"));
    }

    #[tokio::test]
    async fn test_silent_without_client_id() {
        let source = Arc::new(FakeSource::new().without_client_id());
        let ctx = Arc::new(CommandContext::new(source.clone(), TaskStats::default()));

        InviteHandler.process(ctx, payload()).await.unwrap();
        assert!(source.sent().is_empty());
    }
}
