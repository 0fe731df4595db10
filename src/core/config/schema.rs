//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$CODECHAIN_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/codechain/config.toml`
//! 3. `~/.codechain/config.toml` (canonical write location)
//!
//! # Store Config
//!
//! Located at `<state_dir>/config.toml`.
//!
//! # Validation
//!
//! Values are validated after parsing: identities must be well formed, log
//! levels and formats must be known, stake minimums must be positive.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::Identity;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// identity = "0xA11CE"
///
/// [log]
/// level = "debug"
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default caller identity when `--as` is not given.
    pub identity: Option<String>,

    /// Logging defaults
    pub log: Option<LogConfig>,
}

impl GlobalConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(identity) = &self.identity {
            Identity::new(identity.as_str())
                .map_err(|e| ConfigError::InvalidValue(format!("invalid identity: {}", e)))?;
        }
        if let Some(log) = &self.log {
            log.validate()?;
        }
        Ok(())
    }
}

/// Logging section of the global config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Filter directive, e.g. `"info"` or `"codechain=debug"`.
    pub level: Option<String>,

    /// `"text"` or `"json"`.
    pub format: Option<String>,
}

impl LogConfig {
    pub const VALID_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    pub const VALID_FORMATS: &'static [&'static str] = &["text", "json"];

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = &self.level {
            // Directives like `codechain=debug` are left to the filter parser.
            if !level.contains('=') && !Self::VALID_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid log level '{}', must be one of: {}",
                    level,
                    Self::VALID_LEVELS.join(", ")
                )));
            }
        }
        if let Some(format) = &self.format {
            if !Self::VALID_FORMATS.contains(&format.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid log format '{}', must be one of: {}",
                    format,
                    Self::VALID_FORMATS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Store configuration (state directory scope).
///
/// # Example
///
/// ```toml
/// default_min_stake = 1000000000000000000
/// content_dir = "/srv/codechain/objects"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Minimum stake in base units for repositories created without one.
    pub default_min_stake: Option<u64>,

    /// Root of the local content store (default: `<state_dir>/objects`).
    pub content_dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_min_stake == Some(0) {
            return Err(ConfigError::InvalidValue(
                "default_min_stake must be positive".to_string(),
            ));
        }
        if let Some(dir) = &self.content_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "content_dir cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GlobalConfig::default();
            assert!(config.identity.is_none());
            assert!(config.log.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn invalid_identity() {
            let config = GlobalConfig {
                identity: Some("has space".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn roundtrip() {
            let config = GlobalConfig {
                identity: Some("0xA11CE".to_string()),
                log: Some(LogConfig {
                    level: Some("debug".to_string()),
                    format: Some("json".to_string()),
                }),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }

        #[test]
        fn reject_unknown_fields() {
            let result: Result<GlobalConfig, _> = toml::from_str("interactive = true");
            assert!(result.is_err());
        }
    }

    mod log_config {
        use super::*;

        #[test]
        fn known_level_and_directive_accepted() {
            for level in ["info", "codechain=trace"] {
                let config = LogConfig {
                    level: Some(level.to_string()),
                    format: None,
                };
                assert!(config.validate().is_ok(), "{level}");
            }
        }

        #[test]
        fn unknown_level_rejected() {
            let config = LogConfig {
                level: Some("loud".to_string()),
                format: None,
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn unknown_format_rejected() {
            let config = LogConfig {
                level: None,
                format: Some("xml".to_string()),
            };
            assert!(config.validate().is_err());
        }
    }

    mod store_config {
        use super::*;

        #[test]
        fn zero_min_stake_rejected() {
            let config = StoreConfig {
                default_min_stake: Some(0),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn parses_from_toml() {
            let config: StoreConfig = toml::from_str(
                r#"
                default_min_stake = 500
                content_dir = "/tmp/objects"
                "#,
            )
            .unwrap();
            assert_eq!(config.default_min_stake, Some(500));
            assert_eq!(config.content_dir, Some(PathBuf::from("/tmp/objects")));
            assert!(config.validate().is_ok());
        }
    }
}
