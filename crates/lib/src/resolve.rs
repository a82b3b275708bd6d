//! Import resolution.
//!
//! Resolution runs only after every directory has been generated. The
//! [`ProtoResolver`] is obtained by consuming the generating extension, so no
//! provider can be registered once the first import has been resolved.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::label::Label;
use crate::rule::{ImportSpec, Rule, RuleProvider};

/// Import spec -> labels of the rules that provide it.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
  entries: BTreeMap<ImportSpec, Vec<Label>>,
}

impl RuleIndex {
  /// Record that `label` provides `spec`. Re-adding the same pair is a no-op.
  pub fn add(&mut self, spec: ImportSpec, label: Label) {
    let labels = self.entries.entry(spec).or_default();
    if !labels.contains(&label) {
      labels.push(label);
    }
  }

  pub fn find(&self, spec: &ImportSpec) -> &[Label] {
    self.entries.get(spec).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// What a provider sees while resolving one rule.
pub struct ResolveContext<'a> {
  pub repo_name: &'a str,
  pub index: &'a RuleIndex,
}

impl<'a> ResolveContext<'a> {
  pub fn new(repo_name: &'a str, index: &'a RuleIndex) -> Self {
    Self { repo_name, index }
  }
}

/// Label -> the provider that generated the rule with that label.
#[derive(Default)]
pub struct ProviderIndex {
  providers: BTreeMap<Label, Arc<dyn RuleProvider>>,
}

impl ProviderIndex {
  /// Register `provider` under `label`.
  ///
  /// Returns the label back as the error if it is already taken; the existing
  /// provider is kept.
  pub fn insert(&mut self, label: Label, provider: Arc<dyn RuleProvider>) -> Result<(), Label> {
    if self.providers.contains_key(&label) {
      return Err(label);
    }
    self.providers.insert(label, provider);
    Ok(())
  }

  pub fn get(&self, label: &Label) -> Option<&Arc<dyn RuleProvider>> {
    self.providers.get(label)
  }

  pub fn len(&self) -> usize {
    self.providers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.providers.is_empty()
  }
}

/// The resolution half of the extension.
pub struct ProtoResolver {
  name: String,
  providers: ProviderIndex,
}

impl ProtoResolver {
  pub(crate) fn new(name: String, providers: ProviderIndex) -> Self {
    Self { name, providers }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn providers(&self) -> &ProviderIndex {
    &self.providers
  }

  /// Import specs under which `rule`, declared in `pkg`, can be found.
  ///
  /// Rules this extension did not generate provide nothing.
  pub fn imports(&self, repo_name: &str, rule: &Rule, pkg: &str) -> Vec<ImportSpec> {
    let from = Label::new(repo_name, pkg, &rule.name);
    match self.providers.get(&from) {
      Some(provider) => provider.imports(rule, pkg),
      None => {
        trace!(rule = %from, "no provider, no imports");
        Vec::new()
      }
    }
  }

  /// Let the provider of `from` fill in `rule`'s dependency attributes.
  pub fn resolve(&self, ctx: &ResolveContext<'_>, rule: &mut Rule, imports: &[String], from: &Label) {
    match self.providers.get(from) {
      Some(provider) => provider.resolve(ctx, rule, imports, from),
      None => debug!(rule = %from, "no provider registered, skipping resolve"),
    }
  }

  /// Build the import index over every rule this resolver knows about.
  pub fn index<'r, I>(&self, repo_name: &str, rules: I) -> RuleIndex
  where
    I: IntoIterator<Item = (&'r str, &'r Rule)>,
  {
    let mut index = RuleIndex::default();
    for (pkg, rule) in rules {
      let label = Label::new(repo_name, pkg, &rule.name);
      for spec in self.imports(repo_name, rule, pkg) {
        index.add(spec, label.clone());
      }
    }
    index
  }
}
