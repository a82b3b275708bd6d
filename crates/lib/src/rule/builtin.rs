//! Rule kinds shipped with the crate.
//!
//! - `proto_compile`: runs the configured plugins over one library and lists
//!   the predicted outputs.
//! - `proto_compiled_library`: the same, plus the library sources, so the rule
//!   can be found through the import index and gets `deps` on the rules
//!   compiling the files it imports.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::trace;

use crate::config::LanguageRuleConfig;
use crate::label::Label;
use crate::package::ProtocConfiguration;
use crate::resolve::ResolveContext;

use super::registry::{LanguageRule, RuleProvider};
use super::types::{ImportSpec, KindInfo, LoadInfo, Rule};

pub const PROTO_COMPILE_BZL: &str = "@build_stack_rules_proto//rules:proto_compile.bzl";

/// A plugin-driven compile rule for one library in one language.
pub struct ProtoCompileRule {
  implementation: &'static str,
  kind: &'static str,
  suffix: &'static str,
  library: bool,
}

impl ProtoCompileRule {
  pub fn compile() -> Self {
    Self {
      implementation: "builtin:proto_compile",
      kind: "proto_compile",
      suffix: "compile",
      library: false,
    }
  }

  pub fn library() -> Self {
    Self {
      implementation: "builtin:proto_compiled_library",
      kind: "proto_compiled_library",
      suffix: "library",
      library: true,
    }
  }
}

impl LanguageRule for ProtoCompileRule {
  fn name(&self) -> &str {
    self.implementation
  }

  fn kind(&self) -> &str {
    self.kind
  }

  fn kind_info(&self) -> KindInfo {
    let mut mergeable: BTreeSet<String> = ["outputs", "options", "plugins", "proto"]
      .into_iter()
      .map(String::from)
      .collect();
    let mut resolve = BTreeSet::new();
    if self.library {
      mergeable.insert("srcs".to_string());
      resolve.insert("deps".to_string());
    }
    KindInfo {
      match_any: false,
      match_attrs: vec!["proto".to_string()],
      non_empty_attrs: BTreeSet::from(["outputs".to_string()]),
      mergeable_attrs: mergeable,
      resolve_attrs: resolve,
    }
  }

  fn load_info(&self) -> LoadInfo {
    LoadInfo {
      name: PROTO_COMPILE_BZL.to_string(),
      symbols: vec![self.kind.to_string()],
    }
  }

  fn rule_name(&self, pc: &ProtocConfiguration<'_>) -> String {
    format!("{}_{}_{}", pc.library.base_name(), pc.prefix, self.suffix)
  }

  fn provide_rule(&self, cfg: &LanguageRuleConfig, pc: &ProtocConfiguration<'_>) -> Option<Arc<dyn RuleProvider>> {
    if pc.outputs.is_empty() {
      return None;
    }

    let mut rule = Rule::new(self.kind, self.rule_name(pc))
      .with_attr("proto", vec![format!(":{}", pc.library.name)])
      .with_attr("plugins", pc.plugins.iter().map(|p| p.label.to_string()).collect())
      .with_attr("outputs", pc.outputs.clone())
      .with_attr(
        "options",
        pc.plugins
          .iter()
          .flat_map(|p| p.options.iter().map(move |opt| format!("{}={}", p.label, opt)))
          .chain(cfg.options.iter().cloned())
          .collect(),
      );
    if self.library {
      rule.set_attr("srcs", pc.library.files.iter().map(|f| f.basename.clone()).collect());
    }
    for (key, values) in &cfg.attrs {
      rule.set_attr(key, values.clone());
    }
    rule.set_attr("deps", cfg.deps.iter().cloned().collect());
    rule.private_imports = pc.imports.clone();

    Some(Arc::new(ProtoCompileProvider {
      lang: pc.prefix.to_string(),
      library: self.library,
      rule,
    }))
  }
}

/// Provider for one generated `proto_compile`/`proto_compiled_library` rule.
pub struct ProtoCompileProvider {
  lang: String,
  library: bool,
  rule: Rule,
}

impl RuleProvider for ProtoCompileProvider {
  fn kind(&self) -> &str {
    &self.rule.kind
  }

  fn name(&self) -> &str {
    &self.rule.name
  }

  fn rule(&self) -> Rule {
    self.rule.clone()
  }

  fn imports(&self, rule: &Rule, pkg: &str) -> Vec<ImportSpec> {
    if !self.library {
      return Vec::new();
    }
    rule
      .attr_strings("srcs")
      .iter()
      .map(|src| ImportSpec::for_src(&self.lang, pkg, src))
      .collect()
  }

  fn resolve(&self, ctx: &ResolveContext<'_>, rule: &mut Rule, imports: &[String], from: &Label) {
    if !self.library {
      return;
    }

    let mut deps: BTreeSet<String> = rule.attr_strings("deps").iter().cloned().collect();
    for imp in imports {
      let spec = ImportSpec::for_import(&self.lang, imp);
      let found = ctx.index.find(&spec);
      if found.is_empty() {
        trace!(rule = %from, import = %imp, "no rule provides import");
        continue;
      }
      for label in found.iter().filter(|label| *label != from) {
        deps.insert(label.rel(ctx.repo_name, &from.pkg).to_string());
      }
    }
    rule.set_attr("deps", deps.into_iter().collect());
  }
}
