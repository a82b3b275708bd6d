//! CLI output formatting utilities.
//!
//! Colored status lines, attribute listings and JSON output shared by the
//! commands.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const INFO: &str = "•";
  pub const ADD: &str = "+";
  pub const REMOVE: &str = "-";
}

/// `//pkg` for display; the root package is `//`.
pub fn package_label(rel: &str) -> String {
  format!("//{}", rel)
}

/// Join attribute values for a single display line.
pub fn join_values(values: &[String]) -> String {
  values.join(", ")
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_added(message: &str) {
  println!(
    "  {} {}",
    symbols::ADD.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_removed(message: &str) {
  println!(
    "  {} {}",
    symbols::REMOVE.if_supports_color(Stream::Stdout, |s| s.red()),
    message.if_supports_color(Stream::Stdout, |s| s.dimmed())
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "      {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
