//! Library assembly.
//!
//! A [`Library`] is the set of schema files that one existing `proto_library`
//! declaration owns in one directory.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::label::Label;
use crate::schema::File;

/// Suffix stripped from library names when deriving generated rule names.
pub const LIBRARY_NAME_SUFFIX: &str = "_proto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
  /// Package-relative directory of the library.
  pub rel: String,
  /// Name of the declaration that produced the library, e.g. `foo_proto`.
  pub name: String,
  /// Prefix of generated rule names.
  base_name: String,
  /// Matched files, in the order the declaration lists them.
  pub files: Vec<File>,
}

impl Library {
  pub fn new(rel: impl Into<String>, name: impl Into<String>, files: Vec<File>) -> Self {
    let name = name.into();
    let base_name = name.strip_suffix(LIBRARY_NAME_SUFFIX).unwrap_or(&name).to_string();
    Self {
      rel: rel.into(),
      name,
      base_name,
      files,
    }
  }

  /// The library name without its `_proto` suffix, unless
  /// [`disambiguate_base_names`] had to keep it.
  pub fn base_name(&self) -> &str {
    &self.base_name
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  /// Filenames imported directly by any file of the library, sorted.
  pub fn imports(&self) -> BTreeSet<String> {
    self
      .files
      .iter()
      .flat_map(|file| file.imports.iter().map(|imp| imp.filename.clone()))
      .collect()
  }
}

/// Make the base names of libraries declared in one directory unique.
///
/// `foo` and `foo_proto` would both generate `foo_*` rules. Every library
/// whose stripped name is shared falls back to its full name; repeat until no
/// base name is shared. Full names are unique within a directory.
pub fn disambiguate_base_names(libraries: &mut [Library]) {
  loop {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for lib in libraries.iter() {
      *counts.entry(lib.base_name.as_str()).or_default() += 1;
    }
    let shared: BTreeSet<String> = counts
      .into_iter()
      .filter(|(_, count)| *count > 1)
      .map(|(base, _)| base.to_string())
      .collect();

    let mut changed = false;
    for lib in libraries.iter_mut() {
      if lib.base_name != lib.name && shared.contains(&lib.base_name) {
        debug!(library = %lib.name, base = %lib.base_name, "base name is shared, keeping full name");
        lib.base_name = lib.name.clone();
        changed = true;
      }
    }
    if !changed {
      return;
    }
  }
}

/// Select the discovered files named by `srcs`, in `srcs` order.
///
/// Labels that do not name a file discovered in this directory are dropped:
/// a source produced by some other mechanism is simply not a member.
pub fn match_files(files: &HashMap<String, File>, srcs: &[Label]) -> Vec<File> {
  srcs
    .iter()
    .filter_map(|src| match files.get(&src.name) {
      Some(file) => Some(file.clone()),
      None => {
        debug!(src = %src, "source label does not match a discovered file");
        None
      }
    })
    .collect()
}
