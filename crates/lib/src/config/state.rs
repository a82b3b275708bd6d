//! Per-directory configuration state shared between extensions.
//!
//! The driver hands each child directory a clone of its parent's [`Config`].
//! Extension entries are reference counted, so the clone is cheap, and the
//! first mutation through [`get_or_create`] copies the entry before changing
//! it. A child therefore never observes its siblings' directives and never
//! leaks its own back to the parent.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::types::PackageConfig;

/// Extension name -> that extension's configuration for the current directory.
pub type ExtensionState = BTreeMap<String, Arc<PackageConfig>>;

/// Driver-level configuration for one directory.
#[derive(Debug, Clone, Default)]
pub struct Config {
  /// Name of the repository being generated, empty for the main repository.
  pub repo_name: String,
  pub exts: ExtensionState,
}

impl Config {
  pub fn new(repo_name: impl Into<String>) -> Self {
    Self {
      repo_name: repo_name.into(),
      exts: ExtensionState::new(),
    }
  }
}

/// Return this directory's private, mutable config for `key`.
///
/// An inherited entry is cloned and the clone installed under `key` before it
/// is handed out; a missing entry is created fresh.
pub fn get_or_create<'a>(exts: &'a mut ExtensionState, key: &str) -> &'a mut PackageConfig {
  Arc::make_mut(exts.entry(key.to_string()).or_default())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{Directive, PLUGIN_DIRECTIVE};

  fn configure(config: &mut Config, rel: &str, value: &str) {
    get_or_create(&mut config.exts, "protoc")
      .parse_directives(rel, &[Directive::new(PLUGIN_DIRECTIVE, value)])
      .unwrap();
  }

  #[test]
  fn creates_fresh_config() {
    let mut config = Config::new("");
    let cfg = get_or_create(&mut config.exts, "protoc");
    assert_eq!(*cfg, PackageConfig::default());
    assert!(config.exts.contains_key("protoc"));
  }

  #[test]
  fn child_mutations_do_not_leak() {
    let mut parent = Config::new("");
    configure(&mut parent, "", "es implementation bufbuild:es");

    let mut left = parent.clone();
    let mut right = parent.clone();
    configure(&mut left, "left", "es option left=1");
    configure(&mut right, "right", "es option right=1");

    let options = |c: &Config| c.exts["protoc"].plugins["es"].options.clone();
    assert!(options(&parent).is_empty());
    assert_eq!(options(&left).into_iter().collect::<Vec<_>>(), vec!["left=1"]);
    assert_eq!(options(&right).into_iter().collect::<Vec<_>>(), vec!["right=1"]);
    assert_eq!(left.exts["protoc"].plugins["es"].implementation, "bufbuild:es");
  }

  #[test]
  fn grandchild_inherits_through_child() {
    let mut root = Config::new("");
    configure(&mut root, "", "es implementation bufbuild:es");
    let mut child = root.clone();
    configure(&mut child, "a", "es flag --exclude_output=x.ts");
    let mut grandchild = child.clone();
    configure(&mut grandchild, "a/b", "es enabled false");

    assert!(root.exts["protoc"].plugins["es"].flags.is_empty());
    assert!(child.exts["protoc"].plugins["es"].enabled);
    assert_eq!(grandchild.exts["protoc"].plugins["es"].flags, vec!["--exclude_output=x.ts"]);
    assert!(!grandchild.exts["protoc"].plugins["es"].enabled);
  }

  #[test]
  fn cloned_entry_replaces_inherited_one() {
    let mut parent = Config::new("");
    configure(&mut parent, "", "es implementation bufbuild:es");
    let mut child = parent.clone();
    assert!(Arc::ptr_eq(&parent.exts["protoc"], &child.exts["protoc"]));

    get_or_create(&mut child.exts, "protoc");
    assert!(!Arc::ptr_eq(&parent.exts["protoc"], &child.exts["protoc"]));
  }
}
