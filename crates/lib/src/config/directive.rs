//! Directive parsing.
//!
//! Every recognized directive has the form `<name> <param> <value...>`:
//!
//! ```text
//! proto_language ts plugin es
//! proto_language ts rule ts_compile
//! proto_plugin es implementation bufbuild:es
//! proto_plugin es option target=ts
//! proto_plugin es flag --exclude_output=ignored_pb.ts
//! proto_rule ts_compile implementation builtin:proto_compile
//! proto_rule ts_compile dep //tools:runtime
//! proto_rule ts_compile attr visibility //visibility:public
//! ```
//!
//! `plugin`, `rule`, `option` and `dep` values take an intent prefix: `-value`
//! removes an inherited value, `+value` (or a bare value) adds one. Flags are
//! taken literally.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{LanguageConfig, LanguagePluginConfig, LanguageRuleConfig, PackageConfig};

pub const LANGUAGE_DIRECTIVE: &str = "proto_language";
pub const PLUGIN_DIRECTIVE: &str = "proto_plugin";
pub const RULE_DIRECTIVE: &str = "proto_rule";

/// Directive names this crate consumes, in a fixed order.
pub fn known_directives() -> Vec<&'static str> {
  vec![LANGUAGE_DIRECTIVE, PLUGIN_DIRECTIVE, RULE_DIRECTIVE]
}

/// A `key value` annotation from a directory's existing declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DirectiveRepr")]
pub struct Directive {
  pub key: String,
  pub value: String,
}

impl Directive {
  pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      value: value.into(),
    }
  }
}

/// Accepts both `{"key": .., "value": ..}` and `"key value"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DirectiveRepr {
  Pair { key: String, value: String },
  Line(String),
}

impl From<DirectiveRepr> for Directive {
  fn from(repr: DirectiveRepr) -> Self {
    match repr {
      DirectiveRepr::Pair { key, value } => Directive { key, value },
      DirectiveRepr::Line(line) => {
        let line = line.trim();
        let line = line.strip_prefix("# gazelle:").unwrap_or(line);
        match line.split_once(char::is_whitespace) {
          Some((key, value)) => Directive::new(key, value.trim()),
          None => Directive::new(line, ""),
        }
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
  #[error("package {rel:?}: invalid directive '{key} {value}': expected three or more fields, got {got}")]
  TooFewFields {
    rel: String,
    key: String,
    value: String,
    got: usize,
  },

  #[error("package {rel:?}: {key} {name}: unknown parameter {param:?}")]
  UnknownParam {
    rel: String,
    key: String,
    name: String,
    param: String,
  },

  #[error("package {rel:?}: {key} {name}: invalid boolean {value:?}")]
  InvalidBool {
    rel: String,
    key: String,
    name: String,
    value: String,
  },

  #[error("package {rel:?}: {key} {name}: attr needs a name and at least one value")]
  IncompleteAttr { rel: String, key: String, name: String },
}

struct Fields<'a> {
  rel: &'a str,
  key: &'a str,
  name: &'a str,
  param: &'a str,
  values: Vec<&'a str>,
}

impl Fields<'_> {
  fn first(&self) -> &str {
    self.values[0]
  }

  fn joined(&self) -> String {
    self.values.join(" ")
  }

  fn unknown_param(&self) -> DirectiveError {
    DirectiveError::UnknownParam {
      rel: self.rel.to_string(),
      key: self.key.to_string(),
      name: self.name.to_string(),
      param: self.param.to_string(),
    }
  }

  fn bool(&self) -> Result<bool, DirectiveError> {
    self.first().parse().map_err(|_| DirectiveError::InvalidBool {
      rel: self.rel.to_string(),
      key: self.key.to_string(),
      name: self.name.to_string(),
      value: self.first().to_string(),
    })
  }
}

/// Split an intent prefix off a value: `-x` removes, `+x` or `x` adds.
fn parse_intent(value: &str) -> (&str, bool) {
  if let Some(v) = value.strip_prefix('-') {
    (v, false)
  } else if let Some(v) = value.strip_prefix('+') {
    (v, true)
  } else {
    (value, true)
  }
}

fn apply_intent(set: &mut std::collections::BTreeSet<String>, value: &str) {
  let (value, add) = parse_intent(value);
  if add {
    set.insert(value.to_string());
  } else {
    set.remove(value);
  }
}

impl PackageConfig {
  /// Apply the recognized directives in `directives` to this config.
  ///
  /// Directives with other keys are ignored.
  pub fn parse_directives(&mut self, rel: &str, directives: &[Directive]) -> Result<(), DirectiveError> {
    for d in directives {
      if !known_directives().contains(&d.key.as_str()) {
        continue;
      }
      let parts: Vec<&str> = d.value.split_whitespace().collect();
      if parts.len() < 3 {
        return Err(DirectiveError::TooFewFields {
          rel: rel.to_string(),
          key: d.key.clone(),
          value: d.value.clone(),
          got: parts.len(),
        });
      }
      let fields = Fields {
        rel,
        key: &d.key,
        name: parts[0],
        param: parts[1],
        values: parts[2..].to_vec(),
      };
      match d.key.as_str() {
        LANGUAGE_DIRECTIVE => self.parse_language_directive(&fields)?,
        PLUGIN_DIRECTIVE => self.parse_plugin_directive(&fields)?,
        RULE_DIRECTIVE => self.parse_rule_directive(&fields)?,
        _ => unreachable!("filtered by known_directives"),
      }
    }
    Ok(())
  }

  fn parse_language_directive(&mut self, f: &Fields<'_>) -> Result<(), DirectiveError> {
    let lang = self
      .langs
      .entry(f.name.to_string())
      .or_insert_with(|| LanguageConfig::new(f.name));
    match f.param {
      "plugin" => apply_intent(&mut lang.plugins, f.first()),
      "rule" => apply_intent(&mut lang.rules, f.first()),
      "enabled" => lang.enabled = f.bool()?,
      _ => return Err(f.unknown_param()),
    }
    Ok(())
  }

  fn parse_plugin_directive(&mut self, f: &Fields<'_>) -> Result<(), DirectiveError> {
    let plugin = self
      .plugins
      .entry(f.name.to_string())
      .or_insert_with(|| LanguagePluginConfig::new(f.name));
    match f.param {
      "implementation" => plugin.implementation = f.first().to_string(),
      "option" => apply_intent(&mut plugin.options, &f.joined()),
      "flag" => plugin.flags.push(f.joined()),
      "enabled" => plugin.enabled = f.bool()?,
      _ => return Err(f.unknown_param()),
    }
    Ok(())
  }

  fn parse_rule_directive(&mut self, f: &Fields<'_>) -> Result<(), DirectiveError> {
    let rule = self
      .rules
      .entry(f.name.to_string())
      .or_insert_with(|| LanguageRuleConfig::new(f.name));
    match f.param {
      "implementation" => rule.implementation = f.first().to_string(),
      "dep" => apply_intent(&mut rule.deps, f.first()),
      "option" => apply_intent(&mut rule.options, &f.joined()),
      "attr" => {
        if f.values.len() < 2 {
          return Err(DirectiveError::IncompleteAttr {
            rel: f.rel.to_string(),
            key: f.key.to_string(),
            name: f.name.to_string(),
          });
        }
        let values = rule.attrs.entry(f.values[0].to_string()).or_default();
        values.extend(f.values[1..].iter().map(|v| v.to_string()));
      }
      "enabled" => rule.enabled = f.bool()?,
      _ => return Err(f.unknown_param()),
    }
    Ok(())
  }
}
