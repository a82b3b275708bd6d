//! Implementation of the `protogen generate` command.
//!
//! Walks a source tree, generates rules for every directory and prints the
//! resolved result.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use protogen_lib::config::Config;
use protogen_lib::driver::{self, RunOutput};
use protogen_lib::extension::ProtoExtension;
use protogen_lib::rule::Rule;

use crate::output::{
  OutputFormat, join_values, package_label, print_added, print_info, print_json, print_removed, print_stat,
  print_success,
};

pub fn cmd_generate(root: &Path, repo_name: &str, langs: &[String], format: OutputFormat) -> Result<()> {
  let root = dunce::canonicalize(root).with_context(|| format!("Failed to resolve root: {}", root.display()))?;

  debug!(root = %root.display(), repo_name, ?langs, "generating");

  let mut ext = ProtoExtension::default();
  if !langs.is_empty() {
    ext = ext.with_languages(langs.iter().cloned());
  }

  let output = driver::run(&root, ext, Config::new(repo_name))
    .with_context(|| format!("Failed to generate rules under {}", root.display()))?;

  if format.is_json() {
    print_json(&output)?;
  } else {
    print_text(&output);
  }
  Ok(())
}

fn print_text(output: &RunOutput) {
  for load in &output.loads {
    print_info(&format!("load(\"{}\", {})", load.name, quoted(&load.symbols)));
  }

  for pkg in &output.packages {
    println!();
    println!("{}", package_label(&pkg.rel));
    for rule in &pkg.rules {
      print_added(&rule_header(rule));
      for (key, values) in &rule.attrs {
        print_stat(key, &join_values(values));
      }
    }
    for rule in &pkg.empty {
      print_removed(&rule_header(rule));
    }
  }

  println!();
  print_success(&format!(
    "Generated {} rule(s) in {} package(s)",
    output.rule_count(),
    output.packages.len()
  ));
}

fn rule_header(rule: &Rule) -> String {
  format!("{}(name = \"{}\")", rule.kind, rule.name)
}

fn quoted(values: &[String]) -> String {
  values
    .iter()
    .map(|v| format!("\"{}\"", v))
    .collect::<Vec<_>>()
    .join(", ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rule_header() {
    assert_eq!(
      rule_header(&Rule::new("proto_compile", "foo_ts_compile")),
      "proto_compile(name = \"foo_ts_compile\")"
    );
  }

  #[test]
  fn test_quoted() {
    assert_eq!(quoted(&["a".to_string(), "b".to_string()]), "\"a\", \"b\"");
  }
}
