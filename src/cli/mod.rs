//! cli
//!
//! Command-line interface layer for bmk.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load layered configuration and initialize logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers in [`commands`] call into
//! [`crate::core`] and [`crate::stages`], which do the actual work.

pub mod args;
pub mod commands;
pub mod context;
pub mod exit_codes;

pub use args::{Cli, Shell};
pub use context::Context;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::logging;
use crate::ui::output;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let project_dir = match cli.cwd.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let loaded = match Config::load(
        Some(project_dir.as_path()),
        cli.profile.as_deref(),
        &cli.overrides,
    ) {
        Ok(loaded) => loaded,
        Err(e) => {
            logging::init(cli.debug, cli.quiet, None);
            return Err(e).context("Failed to load configuration");
        }
    };
    logging::init(
        cli.debug,
        cli.quiet,
        Some(&loaded.config.settings().logging.level),
    );

    let ctx = Context {
        project_dir,
        debug: cli.debug,
        quiet: cli.quiet,
        config: loaded.config,
    };
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.source),
            ctx.verbosity(),
        );
    }
    tracing::debug!(project = %ctx.project_dir.display(), "starting");

    commands::dispatch(cli.command, &ctx)
}
