//! sync-initconf command - Copy the manifest version into __init__conf__.py

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::context::Context;
use crate::core::initconf::{sync_initconf_version, SyncOutcome, INITCONF_FILE};
use crate::ui::output;

/// Sync the metadata file of the project at `project_dir` (default: the
/// context's project directory).
pub fn sync_initconf(ctx: &Context, project_dir: Option<&Path>) -> Result<()> {
    let dir = match project_dir {
        Some(dir) => ctx.resolve(dir),
        None => ctx.project_dir.clone(),
    };
    let verbosity = ctx.verbosity();

    let outcome = sync_initconf_version(&dir)
        .with_context(|| format!("Failed to sync {} in '{}'", INITCONF_FILE, dir.display()))?;

    match outcome {
        SyncOutcome::Synced { version, path } => {
            output::print(
                format!("Updated {} to version {}", path.display(), version),
                verbosity,
            );
        }
        SyncOutcome::AlreadyInSync { path } => {
            output::print(format!("{} is already up to date", path.display()), verbosity);
        }
        SyncOutcome::NotPresent { path } => {
            output::print(
                format!("No {} at {}, nothing to sync", INITCONF_FILE, path.display()),
                verbosity,
            );
        }
        SyncOutcome::MissingVersion => {
            output::warn("pyproject.toml has no [project].version, nothing synced", verbosity);
        }
    }

    Ok(())
}
