//! The two-pass driver.
//!
//! [`run`] walks a source tree depth first. Each directory is configured on
//! the way down and generated on the way up, so a directory's rules are
//! produced after those of all its subdirectories. Once the walk is complete
//! the extension is finished and every generated rule is resolved against the
//! import index built from the whole tree.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::{Config, DirectiveError};
use crate::extension::{GenerateArgs, GenerateError, GenerateResult, ProtoExtension};
use crate::label::Label;
use crate::manifest::{BuildFile, ManifestError};
use crate::resolve::ResolveContext;
use crate::rule::{LoadInfo, Rule};

#[derive(Debug, Error)]
pub enum DriverError {
  #[error("{0} is not a directory")]
  NotADirectory(PathBuf),

  #[error("failed to list {path}: {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Directive(#[from] DirectiveError),

  #[error(transparent)]
  Generate(#[from] GenerateError),
}

/// The rules generated for one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageOutput {
  pub rel: String,
  /// Generated rules, with dependencies resolved.
  pub rules: Vec<Rule>,
  /// Rules that have nothing left to build and should be deleted.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub empty: Vec<Rule>,
}

/// Everything one run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
  /// Load statements for the kinds that were actually generated.
  pub loads: Vec<LoadInfo>,
  /// Packages with generated or deletable rules, sorted by path.
  pub packages: Vec<PackageOutput>,
}

impl RunOutput {
  pub fn rule_count(&self) -> usize {
    self.packages.iter().map(|pkg| pkg.rules.len()).sum()
  }

  pub fn package(&self, rel: &str) -> Option<&PackageOutput> {
    self.packages.iter().find(|pkg| pkg.rel == rel)
  }
}

struct Generated {
  rel: String,
  result: GenerateResult,
}

struct Walker<'a> {
  ext: &'a mut ProtoExtension,
  generated: Vec<Generated>,
}

/// Generate and resolve rules for the tree under `root`.
///
/// `config` is the configuration of the root directory before its own build
/// file is applied.
pub fn run(root: &Path, mut ext: ProtoExtension, config: Config) -> Result<RunOutput, DriverError> {
  if !root.is_dir() {
    return Err(DriverError::NotADirectory(root.to_path_buf()));
  }

  let repo_name = config.repo_name.clone();
  let mut walker = Walker {
    ext: &mut ext,
    generated: Vec::new(),
  };
  walker.visit(root, "", config)?;
  let mut generated = walker.generated;
  generated.sort_by(|a, b| a.rel.cmp(&b.rel));

  let loads = used_loads(&ext.loads(), &generated);

  // Phase barrier: no provider can be added past this point.
  let resolver = ext.finish();
  let index = resolver.index(
    &repo_name,
    generated
      .iter()
      .flat_map(|g| g.result.rules.iter().map(move |rule| (g.rel.as_str(), rule))),
  );
  debug!(specs = index.len(), "import index built");

  let ctx = ResolveContext::new(&repo_name, &index);
  let mut packages = Vec::new();
  for Generated { rel, result } in generated {
    let GenerateResult { mut rules, imports, empty } = result;
    for (rule, imports) in rules.iter_mut().zip(&imports) {
      let from = Label::new(&repo_name, &rel, &rule.name);
      resolver.resolve(&ctx, rule, imports, &from);
      rule.private_imports.clear();
    }
    if rules.is_empty() && empty.is_empty() {
      continue;
    }
    packages.push(PackageOutput { rel, rules, empty });
  }

  let output = RunOutput { loads, packages };
  info!(
    packages = output.packages.len(),
    rules = output.rule_count(),
    "generation complete"
  );
  Ok(output)
}

impl Walker<'_> {
  fn visit(&mut self, dir: &Path, rel: &str, mut config: Config) -> Result<(), DriverError> {
    let build_file = BuildFile::load(dir)?;
    self.ext.configure(&mut config, rel, build_file.as_ref())?;

    let (subdirs, files) = list_dir(dir)?;
    for name in subdirs {
      let child_rel = if rel.is_empty() {
        name.clone()
      } else {
        format!("{rel}/{name}")
      };
      self.visit(&dir.join(&name), &child_rel, config.clone())?;
    }

    let other_gen = build_file.map(|file| file.rules).unwrap_or_default();
    let result = self.ext.generate_rules(GenerateArgs {
      config: &config,
      dir,
      rel,
      regular_files: &files,
      other_gen: &other_gen,
    })?;
    debug!(rel, rules = result.rules.len(), empty = result.empty.len(), "visited");

    self.generated.push(Generated {
      rel: rel.to_string(),
      result,
    });
    Ok(())
  }
}

/// The visible subdirectories and the regular files of `dir`, each sorted by
/// name.
fn list_dir(dir: &Path) -> Result<(Vec<String>, Vec<String>), DriverError> {
  let mut subdirs = Vec::new();
  let mut files = Vec::new();

  let entries = WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name();
  for entry in entries {
    let entry = entry.map_err(|source| DriverError::Walk {
      path: dir.to_path_buf(),
      source,
    })?;
    let name = entry.file_name().to_string_lossy().into_owned();
    let file_type = entry.file_type();
    if file_type.is_dir() {
      if name.starts_with('.') {
        debug!(dir = %entry.path().display(), "skipping hidden directory");
        continue;
      }
      subdirs.push(name);
    } else if file_type.is_file() {
      files.push(name);
    }
  }

  Ok((subdirs, files))
}

/// Restrict `loads` to the symbols of kinds that were generated.
fn used_loads(loads: &[LoadInfo], generated: &[Generated]) -> Vec<LoadInfo> {
  let kinds: BTreeSet<&str> = generated
    .iter()
    .flat_map(|g| g.result.rules.iter().chain(&g.result.empty))
    .map(|rule| rule.kind.as_str())
    .collect();

  loads
    .iter()
    .filter_map(|load| {
      let symbols: Vec<String> = load
        .symbols
        .iter()
        .filter(|symbol| kinds.contains(symbol.as_str()))
        .cloned()
        .collect();
      (!symbols.is_empty()).then(|| LoadInfo {
        name: load.name.clone(),
        symbols,
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;

  fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
  }

  mod listing {
    use super::*;

    #[test]
    fn sorted_and_hidden_directories_skipped() {
      let dir = TempDir::new().unwrap();
      touch(dir.path(), "b.proto");
      touch(dir.path(), "a.proto");
      touch(dir.path(), "zeta/x.proto");
      touch(dir.path(), "alpha/x.proto");
      touch(dir.path(), ".git/config");

      let (subdirs, files) = list_dir(dir.path()).unwrap();
      assert_eq!(subdirs, vec!["alpha", "zeta"]);
      assert_eq!(files, vec!["a.proto", "b.proto"]);
    }
  }

  mod run {
    use super::*;

    #[test]
    fn root_must_be_a_directory() {
      let dir = TempDir::new().unwrap();
      touch(dir.path(), "file");

      let err = run(&dir.path().join("file"), ProtoExtension::default(), Config::default()).unwrap_err();
      assert!(matches!(err, DriverError::NotADirectory(_)));
    }

    #[test]
    fn empty_tree_produces_nothing() {
      let dir = TempDir::new().unwrap();
      let output = run(dir.path(), ProtoExtension::default(), Config::default()).unwrap();
      assert_eq!(output, RunOutput::default());
    }

    #[test]
    fn malformed_build_file_aborts() {
      let dir = TempDir::new().unwrap();
      fs::create_dir_all(dir.path().join("sub")).unwrap();
      fs::write(dir.path().join("sub/BUILD.json"), "[").unwrap();

      let err = run(dir.path(), ProtoExtension::default(), Config::default()).unwrap_err();
      assert!(matches!(err, DriverError::Manifest(_)));
    }

    #[test]
    fn directive_error_aborts_with_path() {
      let dir = TempDir::new().unwrap();
      fs::create_dir_all(dir.path().join("sub")).unwrap();
      fs::write(
        dir.path().join("sub/BUILD.json"),
        r#"{"directives": ["proto_plugin es"]}"#,
      )
      .unwrap();

      let err = run(dir.path(), ProtoExtension::default(), Config::default()).unwrap_err();
      assert!(matches!(err, DriverError::Directive(_)));
      assert!(err.to_string().contains("\"sub\""));
    }
  }

  mod loads {
    use super::*;

    #[test]
    fn only_generated_kinds_are_loaded() {
      let loads = vec![LoadInfo {
        name: "//rules:defs.bzl".to_string(),
        symbols: vec!["a".to_string(), "b".to_string()],
      }];
      let generated = vec![Generated {
        rel: String::new(),
        result: GenerateResult {
          rules: vec![Rule::new("b", "x")],
          imports: vec![Vec::new()],
          empty: Vec::new(),
        },
      }];

      let used = used_loads(&loads, &generated);
      assert_eq!(used.len(), 1);
      assert_eq!(used[0].symbols, vec!["b"]);
      assert!(used_loads(&loads, &[]).is_empty());
    }
  }
}
