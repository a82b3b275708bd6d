//! The plugin contract.
//!
//! A [`Plugin`] predicts what a code generator will produce for a library and
//! which of its configured options apply. Plugins are looked up by name in a
//! [`PluginRegistry`]; nothing registers itself implicitly.

pub mod builtin;
pub mod options;
pub mod registry;
mod types;

pub use registry::PluginRegistry;
pub use types::*;
