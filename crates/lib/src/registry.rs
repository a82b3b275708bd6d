//! Name-keyed catalogs of rule kinds and plugins.
//!
//! Both catalogs are filled by explicit registration and are read-only once
//! handed to the extension.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
  #[error("{what} {name:?} not found")]
  NotFound { what: &'static str, name: String },

  #[error("{what} {name:?} already registered")]
  AlreadyRegistered { what: &'static str, name: String },
}

/// A catalog of shared implementations keyed by registration name.
///
/// Names are kept sorted, so iteration order never depends on the order in
/// which implementations were registered.
pub struct Registry<T: ?Sized> {
  what: &'static str,
  entries: BTreeMap<String, Arc<T>>,
}

impl<T: ?Sized> Registry<T> {
  /// Create an empty registry; `what` names the entries in error messages.
  pub fn new(what: &'static str) -> Self {
    Self {
      what,
      entries: BTreeMap::new(),
    }
  }

  pub fn register(&mut self, name: impl Into<String>, entry: Arc<T>) -> Result<(), RegistryError> {
    let name = name.into();
    if self.entries.contains_key(&name) {
      return Err(RegistryError::AlreadyRegistered { what: self.what, name });
    }
    self.entries.insert(name, entry);
    Ok(())
  }

  pub fn lookup(&self, name: &str) -> Result<Arc<T>, RegistryError> {
    self
      .entries
      .get(name)
      .cloned()
      .ok_or_else(|| RegistryError::NotFound {
        what: self.what,
        name: name.to_string(),
      })
  }

  /// Registered names, sorted.
  pub fn names(&self) -> Vec<&str> {
    self.entries.keys().map(String::as_str).collect()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<T>)> {
    self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
