use anyhow::Result;

use protogen_lib::extension::ProtoExtension;

use crate::output::{OutputFormat, join_values, print_info, print_json, print_stat};

pub fn cmd_loads(format: OutputFormat) -> Result<()> {
  let loads = ProtoExtension::default().loads();

  if format.is_json() {
    return print_json(&loads);
  }

  for load in &loads {
    print_info(&load.name);
    print_stat("symbols", &join_values(&load.symbols));
  }
  Ok(())
}
