//! Configuration file support.
//!
//! Settings are read from a TOML file.  Lookup order:
//!
//! 1. an explicit path (`--config`)
//! 2. `phpdoc-reflect.toml` in the working directory
//! 3. `phpdoc-reflect/config.toml` in the user's config directory
//! 4. built-in defaults
//!
//! Example:
//!
//! ```toml
//! known_classes = ["Exception", "DateTimeInterface"]
//! nullable_defaults = true
//! log_level = "info"
//!
//! [aliases]
//! "uuid" = "string"
//! "(non-)?empty-map" = "array"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;
use serde::Deserialize;

use crate::error::ConfigError;

/// Name of the project-local configuration file.
pub const CONFIG_FILE_NAME: &str = "phpdoc-reflect.toml";

/// Directory name under the user's config directory.
const CONFIG_DIR_NAME: &str = "phpdoc-reflect";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Extra alias patterns (`pattern → builtin`), tried after the
    /// builtin alias table.
    pub aliases: BTreeMap<String, String>,
    /// Fully-qualified class names treated as existing even when no
    /// source declares them.
    pub known_classes: Vec<String>,
    /// Whether a `= null` default makes a `@method` parameter nullable.
    pub nullable_defaults: bool,
    /// Default log filter when `RUST_LOG` and `--log-level` are unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aliases: BTreeMap::new(),
            known_classes: Vec::new(),
            nullable_defaults: true,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.  `path` is only used in error
    /// messages.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load configuration following the lookup order.  An explicit path
    /// must exist; the implicit locations are skipped when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }
        for candidate in Self::candidate_paths() {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading config");
                return Self::from_file(&candidate);
            }
        }
        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// The implicit configuration locations, in lookup order.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = user_config_dir() {
            paths.push(dir.join(CONFIG_DIR_NAME).join("config.toml"));
        }
        paths
    }
}

fn user_config_dir() -> Option<PathBuf> {
    etcetera::choose_base_strategy()
        .ok()
        .map(|strategy| strategy.config_dir())
}
