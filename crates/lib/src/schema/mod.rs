//! Schema source files.
//!
//! A [`File`] is the parsed form of one `.proto` source: its name and the
//! ordered list of files it imports. [`parse`] reads one from disk.

mod parse;
mod types;

pub use parse::{SchemaError, parse, parse_str};
pub use types::*;
