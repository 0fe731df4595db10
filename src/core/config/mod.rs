//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! codechain has two configuration scopes:
//! - **Global**: User-level settings (default identity, logging)
//! - **Store**: Settings of one state directory (stake default, content dir)
//!
//! # Precedence
//!
//! 1. Default values
//! 2. Global config file
//! 3. Store config file
//! 4. CLI flags and environment (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$CODECHAIN_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/codechain/config.toml`
//! 3. `~/.codechain/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use codechain::core::config::Config;
//! use codechain::core::paths::StatePaths;
//!
//! let paths = StatePaths::new("/var/lib/codechain");
//! let result = Config::load(Some(&paths)).unwrap();
//! let config = result.config;
//!
//! println!("min stake: {}", config.default_min_stake());
//! println!("objects: {}", config.content_dir(&paths).display());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, LogConfig, StoreConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::paths::StatePaths;
use crate::core::stake::DEFAULT_MIN_STAKE;
use crate::core::types::Amount;

/// Environment variable pointing at a global config file.
pub const CONFIG_ENV: &str = "CODECHAIN_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub global: GlobalConfig,
    pub store: Option<StoreConfig>,
    global_path: Option<PathBuf>,
    store_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `paths` is provided, also loads the store config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing files are not an error.
    pub fn load(paths: Option<&StatePaths>) -> Result<ConfigLoadResult, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), paths)
    }

    /// Load from an explicit global config path instead of searching.
    pub fn load_from(
        global_path: Option<&Path>,
        paths: Option<&StatePaths>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let global = match global_path {
            Some(path) if path.exists() => Some(Self::read_toml::<GlobalConfig>(path)?),
            _ => None,
        };
        let global_found = global.as_ref().and(global_path.map(Path::to_path_buf));

        let store_path = paths.map(StatePaths::config_path).filter(|p| p.exists());
        let store = match &store_path {
            Some(path) => Some(Self::read_toml::<StoreConfig>(path)?),
            None => None,
        };

        let global = global.unwrap_or_default();
        global.validate()?;
        if let Some(ref s) = store {
            s.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                store,
                global_path: global_found,
                store_path,
            },
        })
    }

    /// First existing global config file in search order.
    fn find_global() -> Option<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        if let Some(xdg_home) = std::env::var_os("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("codechain/config.toml"));
        }
        if let Ok(path) = Self::global_config_path() {
            candidates.push(path);
        }
        candidates.into_iter().find(|p| p.exists())
    }

    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Canonical global config path: `~/.codechain/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".codechain/config.toml"))
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Default caller identity, if configured.
    pub fn identity(&self) -> Option<&str> {
        self.global.identity.as_deref()
    }

    /// Configured log level directive, if any.
    pub fn log_level(&self) -> Option<&str> {
        self.global.log.as_ref().and_then(|l| l.level.as_deref())
    }

    /// Whether logs should be emitted as JSON.
    ///
    /// Defaults to `false` (text).
    pub fn log_json(&self) -> bool {
        self.global
            .log
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }

    /// Minimum stake for repositories created without one.
    ///
    /// Defaults to one token.
    pub fn default_min_stake(&self) -> Amount {
        self.store
            .as_ref()
            .and_then(|s| s.default_min_stake)
            .map(Amount::new)
            .unwrap_or(DEFAULT_MIN_STAKE)
    }

    /// Content store root for the given state directory.
    pub fn content_dir(&self, paths: &StatePaths) -> PathBuf {
        self.store
            .as_ref()
            .and_then(|s| s.content_dir.clone())
            .unwrap_or_else(|| paths.objects_dir())
    }

    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    pub fn store_config_loaded_from(&self) -> Option<&Path> {
        self.store_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_empty_defaults() {
        let temp = TempDir::new().unwrap();
        let paths = StatePaths::new(temp.path());

        let config = Config::load_from(None, Some(&paths)).unwrap().config;

        assert!(config.identity().is_none());
        assert!(config.log_level().is_none());
        assert!(!config.log_json());
        assert_eq!(config.default_min_stake(), DEFAULT_MIN_STAKE);
        assert_eq!(config.content_dir(&paths), paths.objects_dir());
        assert!(config.global_config_loaded_from().is_none());
        assert!(config.store_config_loaded_from().is_none());
    }

    #[test]
    fn load_global_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("global.toml");
        fs::write(
            &config_path,
            r#"
            identity = "alice"

            [log]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(&config_path), None).unwrap().config;

        assert_eq!(config.identity(), Some("alice"));
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.log_json());
        assert_eq!(config.global_config_loaded_from(), Some(config_path.as_path()));
    }

    #[test]
    fn load_store_file() {
        let temp = TempDir::new().unwrap();
        let paths = StatePaths::new(temp.path());
        fs::write(
            paths.config_path(),
            "default_min_stake = 42\ncontent_dir = \"/elsewhere\"\n",
        )
        .unwrap();

        let config = Config::load_from(None, Some(&paths)).unwrap().config;

        assert_eq!(config.default_min_stake(), Amount::new(42));
        assert_eq!(config.content_dir(&paths), PathBuf::from("/elsewhere"));
    }

    #[test]
    fn invalid_identity_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("global.toml");
        fs::write(&config_path, "identity = \"two words\"").unwrap();

        assert!(matches!(
            Config::load_from(Some(&config_path), None),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let paths = StatePaths::new(temp.path());
        fs::write(paths.config_path(), "trunk = \"main\"").unwrap();

        assert!(matches!(
            Config::load_from(None, Some(&paths)),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
