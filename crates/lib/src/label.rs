//! Build unit labels.
//!
//! A [`Label`] is the `(repository, package, name)` triple that identifies one
//! build unit. Labels are the only keys used to carry state from rule
//! generation over to import resolution.
//!
//! # Accepted forms
//!
//! - `@repo//pkg/path:name` - fully qualified
//! - `//pkg/path:name` - main repository
//! - `//pkg/path` - name defaults to the last package component
//! - `:name` and `name` - relative to the package that mentions them

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a label string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
  #[error("empty label")]
  Empty,

  #[error("label {0:?}: repository must be followed by '//'")]
  MissingPackageSeparator(String),

  #[error("label {0:?}: empty target name")]
  EmptyName(String),

  #[error("label {0:?}: target name may not contain ':'")]
  InvalidName(String),

  #[error("label {0:?}: invalid package path")]
  InvalidPackage(String),
}

/// A parsed build label.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label {
  pub repo: String,
  pub pkg: String,
  pub name: String,
  /// True for `:name` and `name` forms, where `repo` and `pkg` are unknown.
  pub relative: bool,
}

impl Label {
  /// Create an absolute label.
  pub fn new(repo: impl Into<String>, pkg: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      repo: repo.into(),
      pkg: pkg.into(),
      name: name.into(),
      relative: false,
    }
  }

  /// Parse a label string.
  pub fn parse(s: &str) -> Result<Self, LabelError> {
    if s.is_empty() {
      return Err(LabelError::Empty);
    }

    let (repo, rest) = match s.strip_prefix('@') {
      Some(stripped) => {
        let stripped = stripped.strip_prefix('@').unwrap_or(stripped);
        match stripped.find("//") {
          Some(idx) => (&stripped[..idx], &stripped[idx..]),
          // `@repo` is shorthand for `@repo//:repo`
          None if !stripped.is_empty() && !stripped.contains([':', '/']) => {
            return Ok(Self::new(stripped, "", stripped));
          }
          None => return Err(LabelError::MissingPackageSeparator(s.to_string())),
        }
      }
      None => ("", s),
    };

    if let Some(abs) = rest.strip_prefix("//") {
      let (pkg, name) = match abs.split_once(':') {
        Some((pkg, name)) => (pkg, name),
        None => (abs, abs.rsplit('/').next().unwrap_or_default()),
      };
      if pkg.starts_with('/') || pkg.ends_with('/') || pkg.contains("//") {
        return Err(LabelError::InvalidPackage(s.to_string()));
      }
      validate_name(s, name)?;
      return Ok(Self::new(repo, pkg, name));
    }

    let name = rest.strip_prefix(':').unwrap_or(rest);
    validate_name(s, name)?;
    Ok(Self {
      repo: String::new(),
      pkg: String::new(),
      name: name.to_string(),
      relative: true,
    })
  }

  /// Resolve a relative label against the package that mentions it.
  ///
  /// Absolute labels are returned unchanged.
  pub fn abs(&self, repo: &str, pkg: &str) -> Self {
    if !self.relative {
      return self.clone();
    }
    Self::new(repo, pkg, self.name.clone())
  }

  /// Express this label as seen from `repo//pkg`.
  ///
  /// Targets in the same package collapse to `:name`, targets in the same
  /// repository drop the `@repo` prefix.
  pub fn rel(&self, repo: &str, pkg: &str) -> Self {
    if self.relative {
      return self.clone();
    }
    if self.repo == repo && self.pkg == pkg {
      return Self {
        repo: String::new(),
        pkg: String::new(),
        name: self.name.clone(),
        relative: true,
      };
    }
    if self.repo == repo {
      return Self::new("", self.pkg.clone(), self.name.clone());
    }
    self.clone()
  }
}

fn validate_name(input: &str, name: &str) -> Result<(), LabelError> {
  if name.is_empty() {
    return Err(LabelError::EmptyName(input.to_string()));
  }
  if name.contains(':') {
    return Err(LabelError::InvalidName(input.to_string()));
  }
  Ok(())
}

impl fmt::Display for Label {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.relative {
      return write!(f, ":{}", self.name);
    }
    if !self.repo.is_empty() {
      write!(f, "@{}", self.repo)?;
    }
    write!(f, "//{}:{}", self.pkg, self.name)
  }
}

impl std::str::FromStr for Label {
  type Err = LabelError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Label::parse(s)
  }
}

impl TryFrom<String> for Label {
  type Error = LabelError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Label::parse(&value)
  }
}

impl From<Label> for String {
  fn from(label: Label) -> Self {
    label.to_string()
  }
}
