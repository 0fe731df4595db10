//! cli
//!
//! Command-line interface layer for codechain.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and install logging
//! - Delegate to command handlers
//! - Does NOT mutate the registry directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that go through [`crate::engine::Session`] for every write.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::core::config::Config;
use crate::core::paths::StatePaths;
use crate::engine;
use crate::logging::{init_logging, LoggingOptions};
use anyhow::{Context as _, Result};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = engine::Context {
        state: cli.state.clone(),
        identity: cli.identity.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    let paths = StatePaths::resolve(ctx.state.as_deref())
        .context("cannot determine state directory; pass --state or set CODECHAIN_HOME")?;
    let config = Config::load(Some(&paths))
        .context("failed to load configuration")?
        .config;

    init_logging(&LoggingOptions {
        debug: ctx.debug,
        quiet: ctx.quiet,
        level: config.log_level().map(str::to_string),
        json: config.log_json(),
    })?;

    commands::dispatch(cli.command, &ctx, &paths, &config)
}
