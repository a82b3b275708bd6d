//! The rule registry and the capabilities a rule kind exposes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::warn;

use crate::config::LanguageRuleConfig;
use crate::label::Label;
use crate::package::ProtocConfiguration;
use crate::registry::{Registry, RegistryError};
use crate::resolve::ResolveContext;

use super::builtin::ProtoCompileRule;
use super::types::{ImportSpec, KindInfo, LoadInfo, Rule};

/// A rule implementation that can be selected with
/// `proto_rule <name> implementation <impl>`.
pub trait LanguageRule: Send + Sync {
  /// Implementation name the rule is registered under.
  fn name(&self) -> &str;

  /// Kind of the rules this implementation generates.
  fn kind(&self) -> &str;

  fn kind_info(&self) -> KindInfo;

  fn load_info(&self) -> LoadInfo;

  /// Name of the rule generated for one library/language pair.
  fn rule_name(&self, pc: &ProtocConfiguration<'_>) -> String;

  /// Create a provider for the rule, or `None` if the library yields nothing
  /// for this rule to build.
  fn provide_rule(&self, cfg: &LanguageRuleConfig, pc: &ProtocConfiguration<'_>) -> Option<Arc<dyn RuleProvider>>;
}

/// Whatever produced a generated rule, kept around until import resolution.
pub trait RuleProvider: Send + Sync {
  fn kind(&self) -> &str;

  fn name(&self) -> &str;

  /// The generated rule, private imports included.
  fn rule(&self) -> Rule;

  /// Import specs under which `rule` (living in `pkg`) can be found by others.
  fn imports(&self, rule: &Rule, pkg: &str) -> Vec<ImportSpec>;

  /// Translate `imports` into dependency attributes on `rule`.
  fn resolve(&self, ctx: &ResolveContext<'_>, rule: &mut Rule, imports: &[String], from: &Label);
}

pub type RuleRegistry = Registry<dyn LanguageRule>;

fn builtin_rules() -> Vec<Arc<dyn LanguageRule>> {
  vec![Arc::new(ProtoCompileRule::compile()), Arc::new(ProtoCompileRule::library())]
}

impl Registry<dyn LanguageRule> {
  /// An empty rule registry.
  pub fn rules() -> Self {
    Registry::new("rule")
  }

  /// The registry with every rule implementation shipped in this crate.
  pub fn builtin() -> Self {
    let mut registry = Self::rules();
    for rule in builtin_rules() {
      if let Err(err) = registry.register(rule.name().to_string(), rule) {
        warn!(%err, "skipping built-in rule");
      }
    }
    registry
  }

  pub fn rule_names(&self) -> Vec<&str> {
    self.names()
  }

  pub fn lookup_rule(&self, name: &str) -> Result<Arc<dyn LanguageRule>, RegistryError> {
    self.lookup(name)
  }

  /// Kind info for every registered rule, keyed by kind.
  pub fn kinds(&self) -> BTreeMap<String, KindInfo> {
    self
      .iter()
      .map(|(_, rule)| (rule.kind().to_string(), rule.kind_info()))
      .collect()
  }

  /// Load statements needed by every registered rule.
  ///
  /// Symbols sharing a load source are merged and deduplicated. Sources are
  /// sorted by name and symbols within each source are sorted, so the
  /// generated header is stable.
  pub fn loads(&self) -> Vec<LoadInfo> {
    let mut symbols_by_source: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (_, rule) in self.iter() {
      let load = rule.load_info();
      symbols_by_source.entry(load.name).or_default().extend(load.symbols);
    }

    symbols_by_source
      .into_iter()
      .map(|(name, symbols)| LoadInfo {
        name,
        symbols: symbols.into_iter().collect(),
      })
      .collect()
  }
}
