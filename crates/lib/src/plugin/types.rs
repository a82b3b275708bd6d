use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LanguagePluginConfig;
use crate::label::Label;
use crate::library::Library;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
  /// The plugin's flag list could not be parsed.
  #[error("failed to parse flags for plugin {plugin:?}: {message}")]
  InvalidFlags { plugin: String, message: String },
}

/// Everything a plugin sees when asked to configure itself for one library.
pub struct PluginContext<'a> {
  /// Package-relative directory outputs are placed under.
  pub rel: &'a str,
  /// The `proto_plugin` configuration in effect for this directory.
  pub plugin_config: &'a LanguagePluginConfig,
  pub library: &'a Library,
}

/// What a plugin will produce for one library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfiguration {
  pub label: Label,
  /// Predicted outputs, sorted and deduplicated. `None` when the plugin
  /// produces nothing for this library.
  pub outputs: Option<Vec<String>>,
  /// Generator options, filtered, sorted and deduplicated.
  pub options: Vec<String>,
}

/// A code generator that can predict its outputs.
pub trait Plugin: Send + Sync {
  fn name(&self) -> &str;

  fn configure(&self, ctx: &PluginContext<'_>) -> Result<PluginConfiguration, PluginError>;
}
