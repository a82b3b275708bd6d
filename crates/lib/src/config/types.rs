use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Per-directory configuration accumulated from directives.
///
/// Cloning is deep: a child directory's copy shares nothing with its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfig {
  pub langs: BTreeMap<String, LanguageConfig>,
  pub plugins: BTreeMap<String, LanguagePluginConfig>,
  pub rules: BTreeMap<String, LanguageRuleConfig>,
}

/// `proto_language` state: which plugins and rules a language uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
  pub name: String,
  pub plugins: BTreeSet<String>,
  pub rules: BTreeSet<String>,
  pub enabled: bool,
}

impl LanguageConfig {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      plugins: BTreeSet::new(),
      rules: BTreeSet::new(),
      enabled: true,
    }
  }
}

/// `proto_plugin` state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePluginConfig {
  pub name: String,
  /// Name the plugin implementation is registered under.
  pub implementation: String,
  /// Flags handed to the plugin verbatim, in directive order.
  pub flags: Vec<String>,
  /// Generator options, before per-library filtering.
  pub options: BTreeSet<String>,
  pub enabled: bool,
}

impl LanguagePluginConfig {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      implementation: String::new(),
      flags: Vec::new(),
      options: BTreeSet::new(),
      enabled: true,
    }
  }
}

/// `proto_rule` state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRuleConfig {
  pub name: String,
  /// Name the rule implementation is registered under.
  pub implementation: String,
  pub deps: BTreeSet<String>,
  pub attrs: BTreeMap<String, Vec<String>>,
  pub options: BTreeSet<String>,
  pub enabled: bool,
}

impl LanguageRuleConfig {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      implementation: String::new(),
      deps: BTreeSet::new(),
      attrs: BTreeMap::new(),
      options: BTreeSet::new(),
      enabled: true,
    }
  }
}
