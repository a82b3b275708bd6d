//! The generation half of the extension.
//!
//! [`ProtoExtension`] is driven once per directory: [`configure`] pre-order,
//! [`generate_rules`] post-order. Every generated rule's provider is recorded
//! under the rule's label. [`finish`] consumes the extension and hands the
//! completed provider index to a [`ProtoResolver`].
//!
//! [`configure`]: ProtoExtension::configure
//! [`generate_rules`]: ProtoExtension::generate_rules
//! [`finish`]: ProtoExtension::finish

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, DirectiveError, PackageConfig, get_or_create, known_directives};
use crate::label::{Label, LabelError};
use crate::library::{Library, disambiguate_base_names, match_files};
use crate::manifest::BuildFile;
use crate::package::{Package, PackageError};
use crate::plugin::PluginRegistry;
use crate::resolve::{ProtoResolver, ProviderIndex};
use crate::rule::{ImportSpec, KindInfo, LoadInfo, Rule, RuleRegistry};
use crate::schema::{self, File, SchemaError, is_proto_file};

/// Key of the extension's entry in [`Config::exts`].
pub const DEFAULT_EXTENSION_NAME: &str = "protoc";

/// Kind of the existing declarations libraries are assembled from.
pub const PROTO_LIBRARY_KIND: &str = "proto_library";

#[derive(Debug, Error)]
pub enum GenerateError {
  #[error(transparent)]
  Directive(#[from] DirectiveError),

  #[error("package {rel:?}: {source}")]
  Schema {
    rel: String,
    #[source]
    source: SchemaError,
  },

  #[error("{kind} {name:?}: invalid source label {src:?}: {source}")]
  Label {
    kind: String,
    name: String,
    src: String,
    #[source]
    source: LabelError,
  },

  #[error(transparent)]
  Package(#[from] PackageError),

  #[error("rule {0} was generated twice")]
  DuplicateProvider(Label),
}

/// Inputs for one directory's generation step.
pub struct GenerateArgs<'a> {
  /// The directory's configuration, as left by [`ProtoExtension::configure`].
  pub config: &'a Config,
  /// Absolute path of the directory.
  pub dir: &'a Path,
  /// Path of the directory relative to the repository root.
  pub rel: &'a str,
  /// Names of the regular files in the directory.
  pub regular_files: &'a [String],
  /// Declarations produced for this directory by other generators.
  pub other_gen: &'a [Rule],
}

/// Output of one directory's generation step.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateResult {
  pub rules: Vec<Rule>,
  /// Raw imports of each rule in `rules`, index for index.
  pub imports: Vec<Vec<String>>,
  /// Rules with nothing left to build.
  pub empty: Vec<Rule>,
}

pub struct ProtoExtension {
  name: String,
  rules: RuleRegistry,
  plugins: PluginRegistry,
  languages: Option<BTreeSet<String>>,
  providers: ProviderIndex,
}

impl Default for ProtoExtension {
  fn default() -> Self {
    Self::new(DEFAULT_EXTENSION_NAME)
  }
}

impl ProtoExtension {
  /// An extension using the built-in rule kinds and plugins.
  pub fn new(name: impl Into<String>) -> Self {
    Self::with_registries(name, RuleRegistry::builtin(), PluginRegistry::builtin())
  }

  pub fn with_registries(name: impl Into<String>, rules: RuleRegistry, plugins: PluginRegistry) -> Self {
    Self {
      name: name.into(),
      rules,
      plugins,
      languages: None,
      providers: ProviderIndex::default(),
    }
  }

  /// Generate only for the named languages. Other languages are treated as
  /// disabled.
  pub fn with_languages<I, S>(mut self, languages: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.languages = Some(languages.into_iter().map(Into::into).collect());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn known_directives(&self) -> Vec<&'static str> {
    known_directives()
  }

  pub fn rule_registry(&self) -> &RuleRegistry {
    &self.rules
  }

  pub fn plugin_registry(&self) -> &PluginRegistry {
    &self.plugins
  }

  /// Install this directory's copy of the extension config and apply the
  /// directives found in its build file.
  pub fn configure(&self, config: &mut Config, rel: &str, file: Option<&BuildFile>) -> Result<(), DirectiveError> {
    let cfg = get_or_create(&mut config.exts, &self.name);
    if let Some(file) = file {
      cfg.parse_directives(rel, &file.directives)?;
    }
    Ok(())
  }

  pub fn kinds(&self) -> BTreeMap<String, KindInfo> {
    self.rules.kinds()
  }

  pub fn loads(&self) -> Vec<LoadInfo> {
    self.rules.loads()
  }

  /// Import specs of a rule generated so far.
  pub fn imports(&self, repo_name: &str, rule: &Rule, pkg: &str) -> Vec<ImportSpec> {
    let label = Label::new(repo_name, pkg, &rule.name);
    self
      .providers
      .get(&label)
      .map(|provider| provider.imports(rule, pkg))
      .unwrap_or_default()
  }

  /// Generate the rules for one directory.
  pub fn generate_rules(&mut self, args: GenerateArgs<'_>) -> Result<GenerateResult, GenerateError> {
    let cfg = self.package_config(args.config);

    let mut files = HashMap::new();
    for name in args.regular_files.iter().filter(|name| is_proto_file(name)) {
      let file = schema::parse(args.rel, args.dir, name).map_err(|source| GenerateError::Schema {
        rel: args.rel.to_string(),
        source,
      })?;
      debug!(
        file = %file.path(),
        package = file.package.as_deref().unwrap_or_default(),
        imports = file.imports.len(),
        "parsed schema"
      );
      files.insert(file.basename.clone(), file);
    }

    let libraries = self.libraries(&args, &files)?;
    let pkg = Package::new(args.rel, &cfg, &self.rules, &self.plugins, &libraries)?;

    for provider in pkg.rule_providers() {
      let label = Label::new(&args.config.repo_name, args.rel, provider.name());
      self
        .providers
        .insert(label, provider.clone())
        .map_err(GenerateError::DuplicateProvider)?;
    }

    let rules = pkg.rules();
    let imports = rules.iter().map(|rule| rule.private_imports.clone()).collect();
    if !rules.is_empty() {
      info!(rel = %args.rel, rules = rules.len(), "generated rules");
    }

    Ok(GenerateResult {
      rules,
      imports,
      empty: pkg.empty().to_vec(),
    })
  }

  /// End the generation phase.
  pub fn finish(self) -> ProtoResolver {
    debug!(extension = %self.name, providers = self.providers.len(), "generation finished");
    ProtoResolver::new(self.name, self.providers)
  }

  fn package_config(&self, config: &Config) -> PackageConfig {
    let mut cfg = config
      .exts
      .get(&self.name)
      .map(|cfg| (**cfg).clone())
      .unwrap_or_default();
    if let Some(languages) = &self.languages {
      for lang in cfg.langs.values_mut() {
        lang.enabled &= languages.contains(&lang.name);
      }
    }
    cfg
  }

  fn libraries(&self, args: &GenerateArgs<'_>, files: &HashMap<String, File>) -> Result<Vec<Library>, GenerateError> {
    let repo = args.config.repo_name.as_str();
    let mut libraries = Vec::new();
    for rule in args.other_gen.iter().filter(|rule| rule.kind == PROTO_LIBRARY_KIND) {
      let mut srcs = Vec::new();
      for src in rule.attr_strings("srcs") {
        let label = Label::parse(src).map_err(|source| GenerateError::Label {
          kind: rule.kind.clone(),
          name: rule.name.clone(),
          src: src.clone(),
          source,
        })?;
        let label = label.abs(repo, args.rel);
        if label.repo != repo || label.pkg != args.rel {
          debug!(rule = %rule.name, src = %label, "source outside this package");
          continue;
        }
        srcs.push(label);
      }
      libraries.push(Library::new(args.rel, rule.name.clone(), match_files(files, &srcs)));
    }
    disambiguate_base_names(&mut libraries);
    Ok(libraries)
  }
}
