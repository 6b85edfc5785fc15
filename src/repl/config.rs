//! Console configuration
//!
//! Loaded from `config.toml` under the user's config directory
//! (`~/.config/mee/config.toml` on Linux) or from an explicit path:
//!
//! ```toml
//! [console]
//! prompt = "mee> "
//! history_file = "~/.mee_history"
//! history_size = 1000
//!
//! [completion]
//! fallback_budget_ms = 50
//! sort = false
//!
//! [logging]
//! level = "warn"
//!
//! [[types]]
//! name = "Point"
//! instance_methods = ["x", "y"]
//!
//! [globals]
//! "$app_name" = "\"mee\""
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::completion::CompletionOptions;
use crate::scope::{RegistryScope, Scope, TypeDef, TypeKind};

/// Errors while loading a configuration file
#[derive(Debug, Clone)]
pub enum ConfigError {
    Read(PathBuf, String),
    Parse(PathBuf, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(path, msg) => {
                write!(f, "Failed to read config '{}': {}", path.display(), msg)
            }
            ConfigError::Parse(path, msg) => {
                write!(f, "Invalid config '{}': {}", path.display(), msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Complete console configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub console: ConsoleSection,
    pub completion: CompletionSection,
    pub logging: LoggingSection,

    /// Extra types registered in the scope at start-up
    pub types: Vec<TypeDef>,

    /// Global name → expression evaluated at start-up
    pub globals: BTreeMap<String, String>,
}

/// The `[console]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleSection {
    pub prompt: String,
    pub history_file: Option<String>,
    pub history_size: usize,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self {
            prompt: "mee> ".to_string(),
            history_file: None,
            history_size: 1000,
        }
    }
}

/// The `[completion]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionSection {
    /// Milliseconds; 0 disables the budget
    pub fallback_budget_ms: u64,
    pub sort: bool,
}

impl Default for CompletionSection {
    fn default() -> Self {
        Self {
            fallback_budget_ms: 50,
            sort: false,
        }
    }
}

/// The `[logging]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: Option<String>,
}

impl ConsoleConfig {
    /// Default configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mee").join("config.toml"))
    }

    /// Load from `path`, or from [`ConsoleConfig::default_path`].
    ///
    /// A missing default file yields the defaults; a missing explicit
    /// `path` is a [`ConfigError::Read`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!(target: "mee::repl::config", path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e.to_string()))?;
        Self::parse_toml(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))
    }

    pub fn parse_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn completion_options(&self) -> CompletionOptions {
        let budget = match self.completion.fallback_budget_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        CompletionOptions {
            fallback_budget: budget,
            sort: self.completion.sort,
        }
    }

    /// History file path with a leading `~` expanded
    pub fn history_path(&self) -> Option<PathBuf> {
        match self.console.history_file.as_deref() {
            Some(file) => match file.strip_prefix("~/") {
                Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
                None => Some(PathBuf::from(file)),
            },
            None => dirs::home_dir().map(|home| home.join(".mee_history")),
        }
    }

    /// Register the configured types and globals in `scope`.
    ///
    /// A global whose expression fails to evaluate is skipped.
    pub fn apply(&self, scope: &mut RegistryScope) {
        for def in &self.types {
            let mut def = def.clone();
            if def.kind == TypeKind::Class && def.superclass.is_none() && def.name != "BasicObject" {
                def.superclass = Some("Object".to_string());
            }
            debug!(target: "mee::repl::config", name = %def.name, "Registering configured type");
            scope.define_type(def);
        }

        for (name, source) in &self.globals {
            match scope.evaluate(source) {
                Ok(value) => scope.set_global(name, value),
                Err(err) => {
                    warn!(target: "mee::repl::config", global = %name, %err, "Skipping configured global")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Value;
    use std::io::Write;

    const SAMPLE: &str = r#"
[console]
prompt = ">> "
history_size = 10

[completion]
fallback_budget_ms = 0
sort = true

[logging]
level = "debug"

[[types]]
name = "Point"
instance_methods = ["x", "y"]
constants = ["ORIGIN"]

[[types]]
name = "Geometry"
kind = "module"
singleton_methods = ["area"]

[globals]
"$app_name" = "\"mee\""
"$broken" = "undefined_thing"
"#;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::parse_toml("").unwrap();
        assert_eq!(config.console.prompt, "mee> ");
        assert_eq!(config.console.history_size, 1000);
        assert_eq!(config.completion_options(), CompletionOptions::default());
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_parse_sample() {
        let config = ConsoleConfig::parse_toml(SAMPLE).unwrap();
        assert_eq!(config.console.prompt, ">> ");
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        let options = config.completion_options();
        assert_eq!(options.fallback_budget, None);
        assert!(options.sort);
        assert_eq!(config.types.len(), 2);
        assert_eq!(config.types[1].kind, TypeKind::Module);
    }

    #[test]
    fn test_apply_registers_types_and_globals() {
        let config = ConsoleConfig::parse_toml(SAMPLE).unwrap();
        let mut scope = RegistryScope::new();
        config.apply(&mut scope);

        let point = scope.lookup_type("Point").unwrap();
        assert_eq!(point.superclass.as_deref(), Some("Object"));
        assert!(scope.instance_methods_of_type("Point").contains(&"tap".to_string()));
        assert!(scope.constants().contains(&"Geometry".to_string()));
        assert_eq!(scope.global("$app_name"), Some(Value::Str("mee".into())));
        assert_eq!(scope.global("$broken"), None);
    }

    #[test]
    fn test_load_missing_explicit_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = ConsoleConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(&err, ConfigError::Read(path, _) if *path == missing));
        assert!(err.to_string().starts_with("Failed to read config"));
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[console\nprompt = 1").unwrap();
        let err = ConsoleConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(..)));
        assert!(err.to_string().starts_with("Invalid config"));
    }

    #[test]
    fn test_history_path_expands_home() {
        let mut config = ConsoleConfig::default();
        config.console.history_file = Some("/tmp/mee_hist".to_string());
        assert_eq!(config.history_path(), Some(PathBuf::from("/tmp/mee_hist")));
    }
}
