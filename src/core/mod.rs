//! # Core Module
//!
//! Configuration, startup errors, and reply formatting shared by every layer.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod config;
pub mod error;
pub mod response;

pub use config::{Config, ListenerConfig};
pub use error::{Misconfiguration, Scope, StartupError, ValidationError};
pub use response::{chunk_for_message, chunk_text, code_block, MESSAGE_LIMIT};
