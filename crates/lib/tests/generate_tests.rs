//! End-to-end generation over a temporary source tree.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use protogen_lib::config::Config;
use protogen_lib::driver::{self, DriverError, RunOutput};
use protogen_lib::extension::{GenerateError, ProtoExtension};
use protogen_lib::package::PackageError;
use protogen_lib::rule::Rule;
use protogen_lib::rule::builtin::PROTO_COMPILE_BZL;

const ROOT_BUILD: &str = r#"{
  "directives": [
    "proto_language ts plugin es",
    "proto_language ts rule ts_library",
    "proto_language py plugin python",
    "proto_language py rule py_library",
    "proto_plugin es implementation bufbuild:es",
    "proto_plugin python implementation builtin:python",
    "proto_rule ts_library implementation builtin:proto_compiled_library",
    "proto_rule py_library implementation builtin:proto_compiled_library"
  ]
}"#;

fn write(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

fn proto_library(name: &str, srcs: &[&str]) -> String {
  let srcs: Vec<String> = srcs.iter().map(|s| format!("\"{s}\"")).collect();
  format!(
    r#"{{"kind": "proto_library", "name": "{name}", "attrs": {{"srcs": [{}]}}}}"#,
    srcs.join(", ")
  )
}

/// A small tree:
///
/// ```text
/// BUILD.json           language/plugin/rule directives
/// common/c.proto
/// api/foo.proto        imports api/bar.proto and common/c.proto
/// api/bar.proto
/// api/v2/baz.proto     ts disabled here
/// .cache/              hidden, never visited
/// ```
fn tree() -> TempDir {
  let dir = TempDir::new().unwrap();
  let root = dir.path();

  write(root, "BUILD.json", ROOT_BUILD);

  write(root, "common/c.proto", "syntax = \"proto3\";\npackage common;\n");
  write(
    root,
    "common/BUILD.json",
    &format!(r#"{{"rules": [{}]}}"#, proto_library("c_proto", &["c.proto"])),
  );

  write(
    root,
    "api/foo.proto",
    "syntax = \"proto3\";\npackage api;\nimport \"api/bar.proto\";\nimport \"common/c.proto\";\n",
  );
  write(root, "api/bar.proto", "syntax = \"proto3\";\npackage api;\n");
  write(
    root,
    "api/BUILD.json",
    &format!(
      r#"{{
        "directives": [
          "proto_plugin es option Mcommon/c.proto=@x/common",
          "proto_plugin es option Munused.proto=@x/unused"
        ],
        "rules": [{}]
      }}"#,
      proto_library("foo_proto", &["foo.proto", "bar.proto"])
    ),
  );

  write(root, "api/v2/baz.proto", "syntax = \"proto3\";\nimport \"api/foo.proto\";\n");
  write(
    root,
    "api/v2/BUILD.json",
    &format!(
      r#"{{"directives": ["proto_language ts enabled false"], "rules": [{}]}}"#,
      proto_library("baz_proto", &[":baz.proto"])
    ),
  );

  write(root, ".cache/BUILD.json", "not json");

  dir
}

fn run(root: &Path, ext: ProtoExtension) -> RunOutput {
  driver::run(root, ext, Config::new("")).unwrap()
}

fn rule<'a>(output: &'a RunOutput, rel: &str, name: &str) -> &'a Rule {
  output
    .package(rel)
    .and_then(|pkg| pkg.rules.iter().find(|rule| rule.name == name))
    .unwrap_or_else(|| panic!("no rule {name} in {rel:?}"))
}

fn names(output: &RunOutput, rel: &str) -> Vec<String> {
  output
    .package(rel)
    .map(|pkg| pkg.rules.iter().map(|rule| rule.name.clone()).collect())
    .unwrap_or_default()
}

#[test]
fn generates_rules_per_library_and_language() {
  let dir = tree();
  let output = run(dir.path(), ProtoExtension::default());

  let rels: Vec<_> = output.packages.iter().map(|pkg| pkg.rel.as_str()).collect();
  assert_eq!(rels, vec!["api", "api/v2", "common"]);

  assert_eq!(names(&output, "api"), vec!["foo_py_library", "foo_ts_library"]);
  assert_eq!(names(&output, "common"), vec!["c_py_library", "c_ts_library"]);
  assert_eq!(output.rule_count(), 5);

  let foo = rule(&output, "api", "foo_ts_library");
  assert_eq!(foo.attr_strings("srcs"), &["foo.proto".to_string(), "bar.proto".to_string()]);
  assert_eq!(
    foo.attr_strings("outputs"),
    &["api/bar_pb.ts".to_string(), "api/foo_pb.ts".to_string()]
  );
  assert_eq!(foo.attr_strings("proto"), &[":foo_proto".to_string()]);
}

#[test]
fn deps_resolve_across_packages_per_language() {
  let dir = tree();
  let output = run(dir.path(), ProtoExtension::default());

  assert_eq!(
    rule(&output, "api", "foo_ts_library").attr_strings("deps"),
    &["//common:c_ts_library".to_string()]
  );
  assert_eq!(
    rule(&output, "api", "foo_py_library").attr_strings("deps"),
    &["//common:c_py_library".to_string()]
  );
  // api/v2 only generates py, so baz depends on the py flavour of foo.
  assert_eq!(
    rule(&output, "api/v2", "baz_py_library").attr_strings("deps"),
    &["//api:foo_py_library".to_string()]
  );
  assert!(!rule(&output, "common", "c_ts_library").has_attr("deps"));
}

#[test]
fn mapping_options_only_for_used_imports() {
  let dir = tree();
  let output = run(dir.path(), ProtoExtension::default());

  assert_eq!(
    rule(&output, "api", "foo_ts_library").attr_strings("options"),
    &["@build_stack_rules_proto//plugin/bufbuild:es=Mcommon/c.proto=@x/common".to_string()]
  );
  // Options set in api are not inherited by the sibling.
  assert!(!rule(&output, "common", "c_ts_library").has_attr("options"));
}

#[test]
fn child_directives_stay_in_the_child() {
  let dir = tree();
  let output = run(dir.path(), ProtoExtension::default());

  assert_eq!(names(&output, "api/v2"), vec!["baz_py_library"]);
  assert!(names(&output, "api").contains(&"foo_ts_library".to_string()));
}

#[test]
fn language_filter() {
  let dir = tree();
  let output = run(dir.path(), ProtoExtension::default().with_languages(["py"]));

  assert_eq!(names(&output, "api"), vec!["foo_py_library"]);
  assert_eq!(names(&output, "common"), vec!["c_py_library"]);
}

#[test]
fn loads_cover_generated_kinds() {
  let dir = tree();
  let output = run(dir.path(), ProtoExtension::default());

  assert_eq!(output.loads.len(), 1);
  assert_eq!(output.loads[0].name, PROTO_COMPILE_BZL);
  assert_eq!(output.loads[0].symbols, vec!["proto_compiled_library"]);
}

#[test]
fn empty_library_is_reported_for_deletion() {
  let dir = tree();
  write(
    dir.path(),
    "gone/BUILD.json",
    &format!(r#"{{"rules": [{}]}}"#, proto_library("gone_proto", &["gone.proto"])),
  );
  let output = run(dir.path(), ProtoExtension::default());

  let gone = output.package("gone").unwrap();
  assert!(gone.rules.is_empty());
  let empty: Vec<_> = gone.empty.iter().map(|rule| rule.name.as_str()).collect();
  assert_eq!(empty, vec!["gone_py_library", "gone_ts_library"]);
}

#[test]
fn repeated_runs_are_byte_identical() {
  let dir = tree();
  let first = serde_json::to_string_pretty(&run(dir.path(), ProtoExtension::default())).unwrap();
  let second = serde_json::to_string_pretty(&run(dir.path(), ProtoExtension::default())).unwrap();
  assert_eq!(first, second);
  assert!(!first.contains("private_imports"));
}

#[test]
fn json_output_round_trips() {
  let dir = tree();
  let output = run(dir.path(), ProtoExtension::default());
  let json = serde_json::to_string(&output).unwrap();
  let back: RunOutput = serde_json::from_str(&json).unwrap();
  assert_eq!(back, output);
}

#[test]
fn malformed_schema_aborts_the_run() {
  let dir = tree();
  write(dir.path(), "common/broken.proto", "/* never closed");

  let err = driver::run(dir.path(), ProtoExtension::default(), Config::new("")).unwrap_err();
  assert!(matches!(err, DriverError::Generate(GenerateError::Schema { .. })));
  assert!(err.to_string().contains("common"));
}

#[test]
fn unknown_plugin_implementation_aborts_the_run() {
  let dir = tree();
  write(
    dir.path(),
    "common/BUILD.json",
    &format!(
      r#"{{"directives": ["proto_plugin es implementation acme:nope"], "rules": [{}]}}"#,
      proto_library("c_proto", &["c.proto"])
    ),
  );

  let err = driver::run(dir.path(), ProtoExtension::default(), Config::new("")).unwrap_err();
  assert!(matches!(
    err,
    DriverError::Generate(GenerateError::Package(PackageError::UnknownPlugin { .. }))
  ));
}

#[test]
fn named_repository_labels() {
  let dir = tree();
  let output = driver::run(dir.path(), ProtoExtension::default(), Config::new("protos")).unwrap();

  // Deps within the same repository drop the repository name.
  assert_eq!(
    rule(&output, "api", "foo_ts_library").attr_strings("deps"),
    &["//common:c_ts_library".to_string()]
  );
}
