//! Lists what `proto_plugin ... implementation` and
//! `proto_rule ... implementation` may refer to.

use anyhow::Result;
use serde::Serialize;

use protogen_lib::extension::ProtoExtension;

use crate::output::{OutputFormat, print_info, print_json, print_stat};

#[derive(Serialize)]
struct Implementations<'a> {
  plugins: Vec<&'a str>,
  rules: Vec<&'a str>,
}

pub fn cmd_plugins(format: OutputFormat) -> Result<()> {
  let ext = ProtoExtension::default();
  let implementations = Implementations {
    plugins: ext.plugin_registry().names(),
    rules: ext.rule_registry().rule_names(),
  };

  if format.is_json() {
    return print_json(&implementations);
  }

  print_info("Plugins:");
  for name in &implementations.plugins {
    print_stat("plugin", name);
  }
  print_info("Rules:");
  for name in &implementations.rules {
    print_stat("rule", name);
  }
  Ok(())
}
