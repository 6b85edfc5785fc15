//! Context-sensitive completion
//!
//! A fragment flows through three stages:
//! 1. [`classifier`] decides its [`Shape`] and splits it into receiver,
//!    separator and prefix
//! 2. [`provider`] asks the scope for raw candidate names
//! 3. [`formatter`] filters by prefix and renders insertable strings
//!
//! [`Resolver`] wires them together for console hosts.

pub mod catalog;
pub mod classifier;
pub mod doc;
pub mod formatter;
pub mod provider;
pub mod resolver;
pub mod shape;

pub use catalog::{SuggestionCatalog, SuggestionCategory};
pub use classifier::Classifier;
pub use doc::DocTarget;
pub use provider::{CompletionOptions, Unresolvable};
pub use resolver::Resolver;
pub use shape::{ResolvedQuery, Separator, Shape};
