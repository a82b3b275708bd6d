//! Per-directory build manifests.
//!
//! A `BUILD.json` file holds a directory's existing declarations and the
//! directives attached to them. It is the only input the driver reads besides
//! the schema sources themselves.

mod types;

pub use types::*;
