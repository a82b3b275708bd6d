//! The directory-scoped package model.
//!
//! A [`Package`] combines the directory's [`PackageConfig`] with its libraries:
//! for every library and every enabled language it runs the language's
//! plugins, then asks each of the language's rule kinds for a provider.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::config::PackageConfig;
use crate::library::Library;
use crate::plugin::{PluginConfiguration, PluginContext, PluginError, PluginRegistry};
use crate::registry::RegistryError;
use crate::rule::{Rule, RuleProvider, RuleRegistry};

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("package {rel:?}: language {lang:?} uses plugin {plugin:?}, which has no proto_plugin configuration")]
  UnconfiguredPlugin { rel: String, lang: String, plugin: String },

  #[error("package {rel:?}: language {lang:?} uses rule {rule:?}, which has no proto_rule configuration")]
  UnconfiguredRule { rel: String, lang: String, rule: String },

  #[error("package {rel:?}: plugin implementation: {source}")]
  UnknownPlugin {
    rel: String,
    #[source]
    source: RegistryError,
  },

  #[error("package {rel:?}: rule implementation: {source}")]
  UnknownRule {
    rel: String,
    #[source]
    source: RegistryError,
  },

  #[error(transparent)]
  Plugin(#[from] PluginError),
}

/// The plugin results for one library in one language.
pub struct ProtocConfiguration<'a> {
  pub rel: &'a str,
  /// Language name; generated rule names embed it.
  pub prefix: &'a str,
  pub library: &'a Library,
  pub plugins: Vec<PluginConfiguration>,
  /// Union of all plugin outputs, sorted.
  pub outputs: Vec<String>,
  /// Filenames imported by the library's files, sorted.
  pub imports: Vec<String>,
}

impl<'a> ProtocConfiguration<'a> {
  pub fn new(rel: &'a str, prefix: &'a str, library: &'a Library, plugins: Vec<PluginConfiguration>) -> Self {
    let outputs = crate::plugin::options::dedup_and_sort(
      plugins
        .iter()
        .flat_map(|p| p.outputs.iter().flatten().cloned()),
    );
    Self {
      rel,
      prefix,
      library,
      plugins,
      outputs,
      imports: library.imports().into_iter().collect(),
    }
  }
}

pub struct Package {
  providers: Vec<Arc<dyn RuleProvider>>,
  empty: Vec<Rule>,
}

impl Package {
  pub fn new(
    rel: &str,
    cfg: &PackageConfig,
    rules: &RuleRegistry,
    plugins: &PluginRegistry,
    libraries: &[Library],
  ) -> Result<Self, PackageError> {
    let mut providers = Vec::new();
    let mut empty = Vec::new();

    for library in libraries {
      for lang in cfg.langs.values().filter(|lang| lang.enabled) {
        let mut configurations = Vec::new();
        for name in &lang.plugins {
          let plugin_config = cfg.plugins.get(name).ok_or_else(|| PackageError::UnconfiguredPlugin {
            rel: rel.to_string(),
            lang: lang.name.clone(),
            plugin: name.clone(),
          })?;
          if !plugin_config.enabled {
            continue;
          }
          let plugin = plugins
            .lookup_plugin(&plugin_config.implementation)
            .map_err(|source| PackageError::UnknownPlugin {
              rel: rel.to_string(),
              source,
            })?;
          configurations.push(plugin.configure(&PluginContext {
            rel,
            plugin_config,
            library,
          })?);
        }

        let pc = ProtocConfiguration::new(rel, &lang.name, library, configurations);

        for name in &lang.rules {
          let rule_config = cfg.rules.get(name).ok_or_else(|| PackageError::UnconfiguredRule {
            rel: rel.to_string(),
            lang: lang.name.clone(),
            rule: name.clone(),
          })?;
          if !rule_config.enabled {
            continue;
          }
          let rule = rules
            .lookup_rule(&rule_config.implementation)
            .map_err(|source| PackageError::UnknownRule {
              rel: rel.to_string(),
              source,
            })?;
          match rule.provide_rule(rule_config, &pc) {
            Some(provider) => providers.push(provider),
            None => {
              debug!(rel, library = %library.name, lang = %lang.name, kind = rule.kind(), "nothing to generate");
              empty.push(Rule::new(rule.kind(), rule.rule_name(&pc)));
            }
          }
        }
      }
    }

    Ok(Self { providers, empty })
  }

  pub fn rule_providers(&self) -> &[Arc<dyn RuleProvider>] {
    &self.providers
  }

  /// The generated rules, in provider order.
  pub fn rules(&self) -> Vec<Rule> {
    self.providers.iter().map(|p| p.rule()).collect()
  }

  /// Rules that would have been generated but have nothing to build, and
  /// should be removed from existing declarations.
  pub fn empty(&self) -> &[Rule] {
    &self.empty
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{Directive, LANGUAGE_DIRECTIVE, PLUGIN_DIRECTIVE, RULE_DIRECTIVE};
  use crate::schema::File;

  fn config(extra: &[(&str, &str)]) -> PackageConfig {
    let mut directives = vec![
      Directive::new(LANGUAGE_DIRECTIVE, "ts plugin es"),
      Directive::new(LANGUAGE_DIRECTIVE, "ts rule ts_compile"),
      Directive::new(PLUGIN_DIRECTIVE, "es implementation bufbuild:es"),
      Directive::new(RULE_DIRECTIVE, "ts_compile implementation builtin:proto_compile"),
    ];
    directives.extend(extra.iter().map(|(k, v)| Directive::new(*k, *v)));
    let mut cfg = PackageConfig::default();
    cfg.parse_directives("api", &directives).unwrap();
    cfg
  }

  fn build(cfg: &PackageConfig, libraries: &[Library]) -> Result<Package, PackageError> {
    Package::new(
      "api",
      cfg,
      &RuleRegistry::builtin(),
      &PluginRegistry::builtin(),
      libraries,
    )
  }

  fn foo_library() -> Library {
    Library::new("api", "foo_proto", vec![File::new("api", "foo.proto", Vec::new())])
  }

  #[test]
  fn one_rule_per_library_and_language() {
    let pkg = build(&config(&[]), &[foo_library()]).unwrap();

    let rules = pkg.rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].name, "foo_ts_compile");
    assert_eq!(rules[0].attr_strings("outputs"), &["api/foo_pb.ts".to_string()]);
    assert!(pkg.empty().is_empty());
  }

  #[test]
  fn empty_library_marks_rule_for_deletion() {
    let pkg = build(&config(&[]), &[Library::new("api", "gone_proto", Vec::new())]).unwrap();

    assert!(pkg.rules().is_empty());
    assert_eq!(pkg.empty(), &[Rule::new("proto_compile", "gone_ts_compile")]);
  }

  #[test]
  fn disabled_language_generates_nothing() {
    let pkg = build(&config(&[(LANGUAGE_DIRECTIVE, "ts enabled false")]), &[foo_library()]).unwrap();
    assert!(pkg.rules().is_empty());
    assert!(pkg.empty().is_empty());
  }

  #[test]
  fn disabled_plugin_yields_empty_rule() {
    let pkg = build(&config(&[(PLUGIN_DIRECTIVE, "es enabled false")]), &[foo_library()]).unwrap();
    assert!(pkg.rules().is_empty());
    assert_eq!(pkg.empty().len(), 1);
  }

  #[test]
  fn unconfigured_plugin_is_an_error() {
    let err = build(&config(&[(LANGUAGE_DIRECTIVE, "ts plugin ghost")]), &[foo_library()])
      .err()
      .unwrap();
    assert!(matches!(err, PackageError::UnconfiguredPlugin { ref plugin, .. } if plugin == "ghost"));
  }

  #[test]
  fn unknown_plugin_implementation_is_an_error() {
    let err = build(&config(&[(PLUGIN_DIRECTIVE, "es implementation nope:nope")]), &[foo_library()])
      .err()
      .unwrap();
    assert!(matches!(err, PackageError::UnknownPlugin { .. }));
  }

  #[test]
  fn unknown_rule_implementation_is_an_error() {
    let err = build(
      &config(&[(RULE_DIRECTIVE, "ts_compile implementation nope:nope")]),
      &[foo_library()],
    )
    .err()
    .unwrap();
    assert!(matches!(err, PackageError::UnknownRule { .. }));
    assert!(err.to_string().contains("nope:nope"));
  }

  #[test]
  fn bad_plugin_flag_is_an_error() {
    let err = build(&config(&[(PLUGIN_DIRECTIVE, "es flag --bogus")]), &[foo_library()])
      .err()
      .unwrap();
    assert!(matches!(err, PackageError::Plugin(PluginError::InvalidFlags { .. })));
  }
}
