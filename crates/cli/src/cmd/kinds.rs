use anyhow::Result;

use protogen_lib::extension::ProtoExtension;

use crate::output::{OutputFormat, join_values, print_info, print_json, print_stat};

pub fn cmd_kinds(format: OutputFormat) -> Result<()> {
  let kinds = ProtoExtension::default().kinds();

  if format.is_json() {
    return print_json(&kinds);
  }

  for (kind, info) in &kinds {
    print_info(kind);
    print_stat("match", &join_values(&info.match_attrs));
    print_stat(
      "mergeable",
      &join_values(&info.mergeable_attrs.iter().cloned().collect::<Vec<_>>()),
    );
    if !info.resolve_attrs.is_empty() {
      print_stat(
        "resolve",
        &join_values(&info.resolve_attrs.iter().cloned().collect::<Vec<_>>()),
      );
    }
  }
  Ok(())
}
