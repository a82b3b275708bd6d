//! protogen-lib: build rule generation for schema libraries
//!
//! Generation runs in two phases over a source tree:
//! - `extension`: per directory, assembles libraries from existing
//!   `proto_library` declarations, runs the configured plugins and emits one
//!   rule per library, language and rule kind
//! - `resolve`: after the whole tree is generated, turns each rule's imports
//!   into dependency labels
//!
//! `driver::run` wires both phases to a directory walk.

pub mod config;
pub mod driver;
pub mod extension;
pub mod label;
pub mod library;
pub mod manifest;
pub mod package;
pub mod plugin;
pub mod registry;
pub mod resolve;
pub mod rule;
pub mod schema;
