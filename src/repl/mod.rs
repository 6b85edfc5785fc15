//! Interactive console support
//!
//! - TOML configuration with scope extensions
//! - rustyline helper backed by the completion resolver
//! - bracket and quote balance for multi-line input

pub mod completeness;
pub mod config;
pub mod helper;

pub use completeness::{check_completeness, CompletenessStatus};
pub use config::{ConfigError, ConsoleConfig};
pub use helper::ConsoleHelper;
