//! release command - Tag and publish the current version

use anyhow::Result;

use crate::cli::context::Context;
use crate::core::release::{release as run_release, ReleaseEvent, ReleaseOptions};
use crate::ui::output;

/// Push the branch, tag `v<version>`, and publish the GitHub release.
pub fn release(ctx: &Context, remote: Option<&str>, no_github: bool) -> Result<()> {
    let verbosity = ctx.verbosity();
    let options = ReleaseOptions {
        remote: remote.map(str::to_string),
        github_release: !no_github,
    };

    run_release(&ctx.project_dir, &options, |event| {
        let message = match event {
            ReleaseEvent::Target { version, remote } => {
                format!("Releasing {} to '{}'", version, remote)
            }
            ReleaseEvent::PushingBranch { branch, remote } => {
                format!("Pushing branch '{}' to '{}'", branch, remote)
            }
            ReleaseEvent::TagExists { tag } => format!("Tag {} already exists", tag),
            ReleaseEvent::TagCreated { tag } => format!("Created tag {}", tag),
            ReleaseEvent::PushingTag { tag } => format!("Pushing tag {}", tag),
            ReleaseEvent::GitHubReleaseCreated { tag } => {
                format!("Created GitHub release {}", tag)
            }
            ReleaseEvent::GitHubReleaseUpdated { tag } => {
                format!("Updated GitHub release {}", tag)
            }
            ReleaseEvent::GitHubSkipped => {
                "Skipping GitHub release (gh not available or disabled)".to_string()
            }
            ReleaseEvent::Done { tag } => format!("Release {} complete", tag),
        };
        output::print(message, verbosity);
    })?;
    Ok(())
}
