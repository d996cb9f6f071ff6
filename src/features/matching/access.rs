//! Access gate: exposure and permission checks

use crate::commands::definition::{CommandDefinition, ExposureLevel, PermissionLevel};
use crate::source::{Capabilities, Message};

/// Both the exposure and the permission check must pass.
pub fn validate_command_access<C: Capabilities + ?Sized>(
    capabilities: &C,
    definition: &CommandDefinition,
    message: &dyn Message,
) -> bool {
    exposure_allows(capabilities, definition.exposure_level, message)
        && permission_allows(capabilities, definition.permission_level, message)
}

pub fn exposure_allows<C: Capabilities + ?Sized>(
    capabilities: &C,
    level: ExposureLevel,
    message: &dyn Message,
) -> bool {
    match level {
        ExposureLevel::Everywhere => true,
        ExposureLevel::PrivateOnly => capabilities.is_private(message),
        ExposureLevel::PublicOnly => !capabilities.is_private(message),
    }
}

/// Walk down from the required level to `Owner`, passing at the first test
/// the author satisfies.
pub fn permission_allows<C: Capabilities + ?Sized>(
    capabilities: &C,
    level: PermissionLevel,
    message: &dyn Message,
) -> bool {
    match level {
        PermissionLevel::User => true,
        PermissionLevel::Moderator => {
            capabilities.is_moderator(message)
                || permission_allows(capabilities, PermissionLevel::Admin, message)
        }
        PermissionLevel::Admin => {
            capabilities.is_context_owner(message)
                || permission_allows(capabilities, PermissionLevel::Owner, message)
        }
        PermissionLevel::Owner => capabilities.is_bot_owner(message),
    }
}
