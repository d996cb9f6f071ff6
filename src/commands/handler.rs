//! Handler traits for both dispatch tiers
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use super::context::CommandContext;
use super::payload::CommandPayload;

/// Receives every payload the local dispatcher matched.
///
/// Implemented for async closures, so a callback can be written inline:
///
/// ```ignore
/// let callback = |ctx: Arc<CommandContext>, payload: CommandPayload| async move {
///     ctx.reply(&payload, "matched").await
/// };
/// ```
#[async_trait]
pub trait CommandCallback: Send + Sync {
    async fn on_command(&self, ctx: Arc<CommandContext>, payload: CommandPayload) -> Result<()>;
}

#[async_trait]
impl<F, Fut> CommandCallback for F
where
    F: Fn(Arc<CommandContext>, CommandPayload) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn on_command(&self, ctx: Arc<CommandContext>, payload: CommandPayload) -> Result<()> {
        (self)(ctx, payload).await
    }
}

/// Executes one payload-form command, selected by identifier.
#[async_trait]
pub trait PayloadHandler: Send + Sync {
    async fn process(&self, ctx: Arc<CommandContext>, payload: CommandPayload) -> Result<()>;
}

#[async_trait]
impl<F, Fut> PayloadHandler for F
where
    F: Fn(Arc<CommandContext>, CommandPayload) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn process(&self, ctx: Arc<CommandContext>, payload: CommandPayload) -> Result<()> {
        (self)(ctx, payload).await
    }
}
