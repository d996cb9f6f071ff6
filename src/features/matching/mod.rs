//! # Feature: Command Matching
//!
//! Trigger resolution, argument extraction and the access gate. Everything
//! here is synchronous and free of I/O; the local dispatcher runs it on its
//! ingestion loop.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod access;
pub mod arguments;
pub mod trigger;

pub use access::{exposure_allows, permission_allows, validate_command_access};
pub use arguments::{extract_arguments, ArgumentPattern};
pub use trigger::{find_trigger_match, first_trigger_match, is_commands_request};
