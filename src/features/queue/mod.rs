//! # Feature: Work Queue
//!
//! Hand-off between the local dispatcher and the payload dispatcher. In one
//! process this is a plain `mpsc` channel of [`CommandPayload`]s; across a
//! process boundary the payloads travel as framed [`WorkRequest`]s.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod codec;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::commands::context::CommandContext;
use crate::commands::handler::CommandCallback;
use crate::commands::payload::CommandPayload;
use crate::source::MessageSnapshot;

pub use codec::{encode_frame, read_frame, write_frame, MAX_FRAME_LEN};

/// Wire form of a [`CommandPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRequest {
    pub request_id: Uuid,
    pub command_id: String,
    #[serde(default)]
    pub trigger: String,
    #[serde(default)]
    pub arguments: HashMap<String, String>,
    pub message: MessageSnapshot,
    pub queued_at: DateTime<Utc>,
}

impl WorkRequest {
    pub fn from_payload(payload: &CommandPayload) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            command_id: payload.command_id.clone(),
            trigger: payload.trigger.clone(),
            arguments: payload.arguments.clone(),
            message: MessageSnapshot::capture(payload.message.as_ref()),
            queued_at: Utc::now(),
        }
    }

    pub fn into_payload(self) -> CommandPayload {
        CommandPayload::new(
            self.command_id,
            self.trigger,
            self.arguments,
            Arc::new(self.message),
        )
    }
}

/// Callback that pushes every matched payload onto the work queue.
#[derive(Clone)]
pub struct QueueForwarder {
    queue: mpsc::Sender<CommandPayload>,
}

impl QueueForwarder {
    pub fn new(queue: mpsc::Sender<CommandPayload>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl CommandCallback for QueueForwarder {
    async fn on_command(&self, _ctx: Arc<CommandContext>, payload: CommandPayload) -> Result<()> {
        let command_id = payload.command_id.clone();
        self.queue
            .send(payload)
            .await
            .map_err(|_| anyhow!("Work queue closed, dropped '{command_id}'"))
    }
}

/// Drain `payloads` into `writer` as framed [`WorkRequest`]s.
///
/// Returns once the channel closes; a write error ends the bridge.
pub async fn write_requests<W>(mut payloads: mpsc::Receiver<CommandPayload>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(payload) = payloads.recv().await {
        let request = WorkRequest::from_payload(&payload);
        debug!("Forwarding {} as {}", request.command_id, request.request_id);
        write_frame(&mut writer, &request).await?;
    }
    Ok(())
}

/// Decode framed [`WorkRequest`]s from `reader` onto `payloads`.
///
/// Frames that fail to parse are skipped. Returns on end of stream or once
/// the receiving side hung up.
pub async fn read_requests<R>(mut reader: R, payloads: mpsc::Sender<CommandPayload>) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    loop {
        let request = match read_frame::<WorkRequest, _>(&mut reader).await {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(()),
            Err(e) if e.is::<serde_json::Error>() => {
                warn!("Skipping malformed work request: {e}");
                continue;
            }
            Err(e) => return Err(e),
        };

        debug!("Received {} ({})", request.command_id, request.request_id);
        if payloads.send(request.into_payload()).await.is_err() {
            debug!("Payload receiver closed");
            return Ok(());
        }
    }
}
