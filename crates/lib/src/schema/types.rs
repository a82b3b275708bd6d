use serde::{Deserialize, Serialize};

/// Extension recognized as a schema source.
pub const PROTO_EXTENSION: &str = "proto";

/// One `import "..."` statement. `public` and `weak` qualifiers are not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
  pub filename: String,
}

impl Import {
  pub fn new(filename: impl Into<String>) -> Self {
    Self {
      filename: filename.into(),
    }
  }
}

/// A parsed schema source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
  /// Package-relative directory the file was found in.
  pub dir: String,
  /// File name, e.g. `foo.proto`.
  pub basename: String,
  /// File name without extension, e.g. `foo`.
  pub name: String,
  /// Declared schema package, if any.
  pub package: Option<String>,
  /// Import statements in declaration order.
  pub imports: Vec<Import>,
}

impl File {
  pub fn new(dir: &str, basename: &str, imports: Vec<String>) -> Self {
    Self {
      dir: dir.to_string(),
      basename: basename.to_string(),
      name: basename
        .strip_suffix(&format!(".{}", PROTO_EXTENSION))
        .unwrap_or(basename)
        .to_string(),
      package: None,
      imports: imports.into_iter().map(Import::new).collect(),
    }
  }

  /// Repository-relative path, e.g. `api/foo.proto`.
  pub fn path(&self) -> String {
    if self.dir.is_empty() {
      self.basename.clone()
    } else {
      format!("{}/{}", self.dir, self.basename)
    }
  }
}

/// Whether `filename` is a schema source.
pub fn is_proto_file(filename: &str) -> bool {
  std::path::Path::new(filename)
    .extension()
    .is_some_and(|ext| ext == PROTO_EXTENSION)
}
