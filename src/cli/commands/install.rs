//! install command - Install the managed Makefile and report prerequisites

use anyhow::Result;

use crate::cli::context::Context;
use crate::core::install::{check_prerequisites, format_report, install_makefile, InstallOutcome};
use crate::ui::output;

/// Install or update the bmk Makefile in the project directory.
pub fn install(ctx: &Context) -> Result<()> {
    let verbosity = ctx.verbosity();

    match install_makefile(&ctx.project_dir)? {
        InstallOutcome::Installed { path, version } => output::print(
            format!(
                "Installed bmk Makefile {} at {}",
                version.as_deref().unwrap_or("(unversioned)"),
                path.display()
            ),
            verbosity,
        ),
        InstallOutcome::Updated { path, from, to } => output::print(
            format!(
                "Updated bmk Makefile at {} ({} -> {})",
                path.display(),
                from.as_deref().unwrap_or("unknown"),
                to.as_deref().unwrap_or("unknown")
            ),
            verbosity,
        ),
    }

    let checks = check_prerequisites();
    output::print(format_report(&checks), verbosity);
    let missing = checks.iter().filter(|c| !c.found()).count();
    if missing > 0 {
        output::warn(
            format!("{} prerequisite(s) missing; some stage scripts may fail", missing),
            verbosity,
        );
    }
    Ok(())
}
