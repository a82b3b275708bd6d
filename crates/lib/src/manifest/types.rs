use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Directive;
use crate::rule::Rule;

/// File name of a directory's build manifest.
pub const BUILD_FILE_NAME: &str = "BUILD.json";

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },
}

/// The existing declarations of one directory.
///
/// # Example
///
/// ```json
/// {
///   "directives": [
///     "proto_language ts plugin es",
///     {"key": "proto_plugin", "value": "es implementation bufbuild:es"}
///   ],
///   "rules": [
///     {"kind": "proto_library", "name": "foo_proto", "attrs": {"srcs": ["foo.proto"]}}
///   ]
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildFile {
  #[serde(default)]
  pub directives: Vec<Directive>,
  #[serde(default)]
  pub rules: Vec<Rule>,
}

impl BuildFile {
  /// Load `dir`'s manifest. Returns `Ok(None)` if the directory has none.
  pub fn load(dir: &Path) -> Result<Option<Self>, ManifestError> {
    let path = dir.join(BUILD_FILE_NAME);

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(source) => {
        return Err(ManifestError::Read {
          path: path.display().to_string(),
          source,
        });
      }
    };

    let file = serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
      path: path.display().to_string(),
      source,
    })?;
    Ok(Some(file))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn write(dir: &TempDir, content: &str) {
    fs::write(dir.path().join(BUILD_FILE_NAME), content).unwrap();
  }

  #[test]
  fn missing_file_is_none() {
    let dir = TempDir::new().unwrap();
    assert!(BuildFile::load(dir.path()).unwrap().is_none());
  }

  #[test]
  fn loads_directives_and_rules() {
    let dir = TempDir::new().unwrap();
    write(
      &dir,
      r#"{
        "directives": ["proto_language ts plugin es"],
        "rules": [
          {"kind": "proto_library", "name": "foo_proto", "attrs": {"srcs": ["foo.proto"]}},
          {"kind": "filegroup", "name": "other"}
        ]
      }"#,
    );

    let file = BuildFile::load(dir.path()).unwrap().unwrap();
    assert_eq!(file.directives, vec![Directive::new("proto_language", "ts plugin es")]);
    assert_eq!(file.rules.len(), 2);
    assert_eq!(file.rules[0].kind, "proto_library");
    assert_eq!(file.rules[0].attr_strings("srcs"), &["foo.proto".to_string()]);
  }

  #[test]
  fn empty_object_is_valid() {
    let dir = TempDir::new().unwrap();
    write(&dir, "{}");
    assert_eq!(BuildFile::load(dir.path()).unwrap(), Some(BuildFile::default()));
  }

  #[test]
  fn malformed_json_names_the_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "{ not json");

    let err = BuildFile::load(dir.path()).unwrap_err();
    assert!(matches!(err, ManifestError::Parse { .. }));
    assert!(err.to_string().contains(BUILD_FILE_NAME));
  }

  #[test]
  fn unknown_fields_are_rejected() {
    let dir = TempDir::new().unwrap();
    write(&dir, r#"{"rulez": []}"#);
    assert!(BuildFile::load(dir.path()).is_err());
  }
}
