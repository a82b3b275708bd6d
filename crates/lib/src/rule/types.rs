use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A generated or pre-existing build declaration.
///
/// `attrs` is kept in a [`BTreeMap`] so that serialized rules are byte-stable
/// across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
  pub kind: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub attrs: BTreeMap<String, Vec<String>>,
  /// Import filenames handed from rule generation to import resolution.
  /// Never serialized.
  #[serde(skip)]
  pub private_imports: Vec<String>,
}

impl Rule {
  pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      kind: kind.into(),
      name: name.into(),
      attrs: BTreeMap::new(),
      private_imports: Vec::new(),
    }
  }

  /// Builder-style attribute setter. Empty values are not stored.
  pub fn with_attr(mut self, key: &str, values: Vec<String>) -> Self {
    self.set_attr(key, values);
    self
  }

  pub fn attr_strings(&self, key: &str) -> &[String] {
    self.attrs.get(key).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn set_attr(&mut self, key: &str, values: Vec<String>) {
    if values.is_empty() {
      self.attrs.remove(key);
    } else {
      self.attrs.insert(key.to_string(), values);
    }
  }

  pub fn has_attr(&self, key: &str) -> bool {
    self.attrs.contains_key(key)
  }
}

/// How the declaration merger should match and merge rules of one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindInfo {
  /// Any existing rule of this kind matches, regardless of name.
  pub match_any: bool,
  /// Attributes whose values identify a matching existing rule.
  pub match_attrs: Vec<String>,
  /// Attributes that must be non-empty for the rule to be kept.
  pub non_empty_attrs: BTreeSet<String>,
  /// Attributes the generator owns and may overwrite on merge.
  pub mergeable_attrs: BTreeSet<String>,
  /// Attributes filled in during import resolution.
  pub resolve_attrs: BTreeSet<String>,
}

/// The file a rule kind is loaded from and the symbols it provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadInfo {
  pub name: String,
  pub symbols: Vec<String>,
}

/// One importable unit a rule exposes to the cross-extension import index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImportSpec {
  pub lang: String,
  pub imp: String,
}

impl ImportSpec {
  pub fn new(lang: impl Into<String>, imp: impl Into<String>) -> Self {
    Self {
      lang: lang.into(),
      imp: imp.into(),
    }
  }

  /// Import spec for a source file living in package `pkg`: `//pkg:src`.
  pub fn for_src(lang: &str, pkg: &str, src: &str) -> Self {
    Self::new(lang, format!("//{}:{}", pkg, src))
  }

  /// Import spec for an import statement such as `"a/b/c.proto"`, which
  /// names file `c.proto` in package `a/b`.
  pub fn for_import(lang: &str, filename: &str) -> Self {
    match filename.rsplit_once('/') {
      Some((pkg, base)) => Self::for_src(lang, pkg, base),
      None => Self::for_src(lang, "", filename),
    }
  }
}
