//! Package configuration.
//!
//! Each directory carries a [`PackageConfig`] built from the directives found
//! in its existing declarations, inherited from its parent by copy-on-write.
//!
//! # Submodules
//!
//! - [`directive`] - directive grammar and parsing
//! - [`state`] - the per-directory [`Config`] and [`get_or_create`]

pub mod directive;
pub mod state;
mod types;

pub use directive::{
  Directive, DirectiveError, LANGUAGE_DIRECTIVE, PLUGIN_DIRECTIVE, RULE_DIRECTIVE, known_directives,
};
pub use state::{Config, ExtensionState, get_or_create};
pub use types::*;
