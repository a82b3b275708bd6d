//! Plugins shipped with the crate.
//!
//! Each built-in plugin emits one output per schema file, named after the
//! file with a fixed suffix: `foo.proto` becomes `foo_pb.ts` for `bufbuild:es`.

use std::collections::BTreeSet;

use clap::Parser;
use tracing::trace;

use crate::label::Label;

use super::options::{dedup_and_sort, filter_options};
use super::types::{Plugin, PluginConfiguration, PluginContext, PluginError};

const PLUGIN_REPO: &str = "build_stack_rules_proto";

/// Flags understood by every built-in plugin.
#[derive(Debug, Default, Parser)]
#[command(no_binary_name = true, disable_help_flag = true, disable_version_flag = true)]
pub struct OutputFlags {
  /// `--exclude_output=foo.ts,bar.ts` suppresses those files from the outputs.
  #[arg(long = "exclude_output", value_delimiter = ',')]
  pub exclude_output: Vec<String>,
}

impl OutputFlags {
  /// Parse a plugin's flag list. Unknown flags are an error.
  ///
  /// Long flags may be written with one dash or two: `-exclude_output=a` and
  /// `--exclude_output=a` are the same flag.
  pub fn parse_for(plugin: &str, args: &[String]) -> Result<Self, PluginError> {
    Self::try_parse_from(args.iter().map(|arg| long_flag(arg))).map_err(|e| PluginError::InvalidFlags {
      plugin: plugin.to_string(),
      message: e
        .to_string()
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string(),
    })
  }

  pub fn excluded(&self) -> BTreeSet<&str> {
    self.exclude_output.iter().map(String::as_str).collect()
  }
}

/// Rewrite a single-dash long flag (`-name`, `-name=value`) to its `--` form.
fn long_flag(arg: &str) -> String {
  let Some(rest) = arg.strip_prefix('-') else {
    return arg.to_string();
  };
  let name = rest.split('=').next().unwrap_or_default();
  if rest.starts_with('-') || name.len() < 2 {
    return arg.to_string();
  }
  format!("--{rest}")
}

/// A plugin whose outputs are `<file name><suffix>`.
pub struct SuffixPlugin {
  name: &'static str,
  label: Label,
  suffix: &'static str,
}

impl SuffixPlugin {
  pub fn new(name: &'static str, pkg: &str, target: &str, suffix: &'static str) -> Self {
    Self {
      name,
      label: Label::new(PLUGIN_REPO, pkg, target),
      suffix,
    }
  }

  /// `bufbuild:connect-es`: connect services for TypeScript.
  pub fn connect_es() -> Self {
    Self::new("bufbuild:connect-es", "plugin/bufbuild", "connect-es", ".pb.ts")
  }

  /// `bufbuild:es`: protobuf-es messages.
  pub fn es() -> Self {
    Self::new("bufbuild:es", "plugin/bufbuild", "es", "_pb.ts")
  }

  /// `builtin:python`: protoc's python generator.
  pub fn python() -> Self {
    Self::new("builtin:python", "plugin/builtin", "python", "_pb2.py")
  }
}

impl Plugin for SuffixPlugin {
  fn name(&self) -> &str {
    self.name
  }

  fn configure(&self, ctx: &PluginContext<'_>) -> Result<PluginConfiguration, PluginError> {
    let flags = OutputFlags::parse_for(self.name, &ctx.plugin_config.flags)?;
    let excluded = flags.excluded();

    let imports = ctx.library.imports();
    let options = filter_options(&ctx.plugin_config.options, &imports);

    let mut outputs = Vec::new();
    for file in &ctx.library.files {
      let output = format!("{}{}", file.name, self.suffix);
      if excluded.contains(output.as_str()) {
        trace!(plugin = self.name, output = %output, "output excluded by flag");
        continue;
      }
      if ctx.rel.is_empty() {
        outputs.push(output);
      } else {
        outputs.push(format!("{}/{}", ctx.rel, output));
      }
    }
    let outputs = dedup_and_sort(outputs);

    Ok(PluginConfiguration {
      label: self.label.clone(),
      outputs: (!outputs.is_empty()).then_some(outputs),
      options,
    })
  }
}
