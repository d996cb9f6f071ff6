//! # Discord Adapter
//!
//! Implements the message source over `serenity`: gateway messages become
//! [`DiscordMessage`]s and [`DiscordClient`] answers capability tests and
//! sends replies.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod client;
pub mod message;

pub use client::{BotIdentity, DiscordClient};
pub use message::DiscordMessage;
