//! Plugin registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Keep registration order so match precedence is deterministic
//! - 1.0.0: Name-keyed map of plugins

use log::warn;
use std::sync::Arc;

/// Anything registered by name.
pub trait NamedPlugin: Send + Sync {
    fn name(&self) -> &str;
}

/// Plugins in registration order, unique by name.
///
/// Registering a second plugin under a taken name logs a warning and
/// replaces the first one in its original slot.
pub struct PluginRegistry<P: ?Sized> {
    plugins: Vec<Arc<P>>,
}

impl<P: ?Sized + NamedPlugin> PluginRegistry<P> {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Returns `true` when an earlier plugin with the same name was replaced.
    pub fn register(&mut self, plugin: Arc<P>) -> bool {
        match self.plugins.iter().position(|p| p.name() == plugin.name()) {
            Some(index) => {
                warn!("Plugin with that name already registered: {}", plugin.name());
                self.plugins[index] = plugin;
                true
            }
            None => {
                self.plugins.push(plugin);
                false
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<P>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    /// Plugins in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<P>> {
        self.plugins.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl<P: ?Sized> Clone for PluginRegistry<P> {
    fn clone(&self) -> Self {
        Self {
            plugins: self.plugins.clone(),
        }
    }
}

impl<P: ?Sized + NamedPlugin> Default for PluginRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}
