//! clean command - Remove build artifacts and caches

use anyhow::{Context as _, Result};

use crate::cli::context::Context;
use crate::core::clean::{clean as clean_project, clean_patterns};
use crate::ui::output;

/// Remove everything matched by the project's clean patterns.
pub fn clean(ctx: &Context, dry_run: bool, verbose: bool) -> Result<()> {
    let verbosity = ctx.verbosity();
    let patterns = clean_patterns(&ctx.project_dir)?;
    tracing::debug!(?patterns, "clean patterns");

    let report = clean_project(&ctx.project_dir, &patterns, dry_run)
        .with_context(|| format!("Failed to clean '{}'", ctx.project_dir.display()))?;

    for entry in &report.entries {
        let path = entry.path.display();
        if dry_run {
            output::print(format!("[DRY RUN] Would remove: {}", path), verbosity);
        } else if verbose {
            output::print(format!("Removed: {}", path), verbosity);
        } else {
            output::detail(format!("Removed: {}", path), verbosity);
        }
    }

    let count = report.count();
    let summary = match (dry_run, count) {
        (_, 0) => "Nothing to clean".to_string(),
        (true, n) => format!("[DRY RUN] {} path(s) would be removed", n),
        (false, n) => format!("Removed {} path(s)", n),
    };
    output::print(summary, verbosity);
    Ok(())
}
