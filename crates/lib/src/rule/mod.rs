//! Build rules, the kinds that generate them, and their providers.
//!
//! # Submodules
//!
//! - [`registry`] - the [`RuleRegistry`] plus the [`LanguageRule`] and
//!   [`RuleProvider`] capabilities
//! - [`builtin`] - rule kinds shipped with the crate

pub mod builtin;
pub mod registry;
mod types;

pub use registry::{LanguageRule, RuleProvider, RuleRegistry};
pub use types::*;
