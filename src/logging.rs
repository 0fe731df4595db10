//! Logging System
//!
//! Structured logging with `tracing`. Library code only emits events; the
//! binary installs the subscriber once at startup via [`init_logging`].
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//!
//! # Filter precedence
//!
//! Highest to lowest:
//! 1. `CODECHAIN_LOG` environment variable (full `EnvFilter` syntax)
//! 2. `--debug` flag (`debug`)
//! 3. `--quiet` flag (`error`)
//! 4. Config `[log] level`
//! 5. `info`

use thiserror::Error;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CODECHAIN_LOG";

/// Errors from logging setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Logging options gathered from flags and config.
#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    pub debug: bool,
    pub quiet: bool,
    /// `[log] level` from config.
    pub level: Option<String>,
    /// Emit JSON lines instead of text.
    pub json: bool,
}

/// Pick the filter directive for the given options and environment value.
pub fn filter_directive(options: &LoggingOptions, env: Option<String>) -> String {
    if let Some(directive) = env.filter(|d| !d.trim().is_empty()) {
        return directive;
    }
    if options.debug {
        return "debug".to_string();
    }
    if options.quiet {
        return "error".to_string();
    }
    options
        .level
        .clone()
        .unwrap_or_else(|| "info".to_string())
}

fn build_env_filter(options: &LoggingOptions) -> Result<EnvFilter, LoggingError> {
    let directive = filter_directive(options, std::env::var(LOG_ENV).ok());
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter {
        directive,
        message: e.to_string(),
    })
}

/// Install the global subscriber.
pub fn init_logging(options: &LoggingOptions) -> Result<(), LoggingError> {
    let filter = build_env_filter(options)?;
    let base_subscriber = Registry::default().with(filter);

    let result = if options.json {
        base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}
