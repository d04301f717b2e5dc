//! bump command - Increment the project version

use anyhow::{Context as _, Result};

use crate::cli::context::Context;
use crate::core::changelog::update_changelog;
use crate::core::initconf::{sync_initconf_version, SyncOutcome, INITCONF_FILE};
use crate::core::version::{current_version, update_pyproject, BumpPart, Version};
use crate::ui::output;

/// Bump `part` of the version in pyproject.toml.
///
/// The changelog gets a release header when present and the package
/// metadata file is synced afterwards. The new version is computed before
/// anything is written; once the manifest is written, a failed metadata sync
/// is only a warning so a re-run does not bump twice.
pub fn bump(ctx: &Context, part: BumpPart) -> Result<()> {
    let dir = &ctx.project_dir;
    let verbosity = ctx.verbosity();

    let current: Version = current_version(dir)?.parse()?;
    let next = current.bump(part)?.to_string();

    let change = update_pyproject(dir, &next)?;

    let changelog = update_changelog(dir, &change.new, chrono::Local::now())
        .context("Failed to update CHANGELOG.md")?;
    if let Some(path) = changelog {
        output::detail(format!("Updated {}", path.display()), verbosity);
    }

    match sync_initconf_version(dir) {
        Ok(SyncOutcome::Synced { path, .. }) => {
            output::detail(format!("Updated {}", path.display()), verbosity);
        }
        Ok(_) => {}
        Err(e) => {
            tracing::debug!(error = %e, "metadata sync after bump failed");
            output::warn(format!("{} not synced: {}", INITCONF_FILE, e), verbosity);
        }
    }

    output::print(
        format!("Bumped version: {} -> {}", change.old, change.new),
        verbosity,
    );
    Ok(())
}
