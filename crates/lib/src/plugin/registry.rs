//! The plugin registry.

use std::sync::Arc;

use tracing::warn;

use crate::registry::{Registry, RegistryError};

use super::builtin::SuffixPlugin;
use super::types::Plugin;

pub type PluginRegistry = Registry<dyn Plugin>;

fn builtin_plugins() -> Vec<Arc<dyn Plugin>> {
  vec![
    Arc::new(SuffixPlugin::connect_es()),
    Arc::new(SuffixPlugin::es()),
    Arc::new(SuffixPlugin::python()),
  ]
}

impl Registry<dyn Plugin> {
  /// An empty plugin registry.
  pub fn plugins() -> Self {
    Registry::new("plugin")
  }

  /// The registry with every plugin shipped in this crate.
  pub fn builtin() -> Self {
    let mut registry = Self::plugins();
    for plugin in builtin_plugins() {
      if let Err(err) = registry.register_plugin(plugin) {
        warn!(%err, "skipping built-in plugin");
      }
    }
    registry
  }

  /// Register a plugin under its own name.
  pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), RegistryError> {
    self.register(plugin.name().to_string(), plugin)
  }

  pub fn lookup_plugin(&self, name: &str) -> Result<Arc<dyn Plugin>, RegistryError> {
    self.lookup(name)
  }
}
