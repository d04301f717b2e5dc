//! core::release
//!
//! Tag-and-push release flow.
//!
//! # Steps
//!
//! 1. Read `X.Y.Z` from the manifest
//! 2. Resolve the remote (explicit, then `[tool.git].default-remote`, then `origin`)
//! 3. Require a clean working tree
//! 4. Delete a stray `v` tag locally and on the remote
//! 5. Push the current branch
//! 6. Create annotated tag `v<version>` unless it exists, then push it
//! 7. Create or edit the GitHub release when `gh` is installed
//!
//! Progress is reported through [`ReleaseEvent`] so the caller decides how
//! to render it.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::manifest::{Manifest, ManifestError};
use crate::git::{Git, GitError, GitHub};

/// Remote used when neither the caller nor the manifest names one.
pub const DEFAULT_REMOTE: &str = "origin";

static SEMVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").expect("semver pattern is valid"));

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("could not read version X.Y.Z from pyproject.toml (found {found:?})")]
    InvalidVersion { found: Option<String> },

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Release inputs.
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    /// Remote name; resolved from the manifest when `None`.
    pub remote: Option<String>,
    /// Create the GitHub release through `gh` when available.
    pub github_release: bool,
}

/// Progress notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseEvent {
    Target { version: String, remote: String },
    PushingBranch { branch: String, remote: String },
    TagExists { tag: String },
    TagCreated { tag: String },
    PushingTag { tag: String },
    GitHubReleaseCreated { tag: String },
    GitHubReleaseUpdated { tag: String },
    GitHubSkipped,
    Done { tag: String },
}

/// Result of a completed release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub version: String,
    pub tag: String,
    pub remote: String,
    pub branch: String,
}

/// Whether `version` is strict `X.Y.Z`.
pub fn looks_like_semver(version: &str) -> bool {
    SEMVER.is_match(version)
}

/// Remote precedence: explicit > manifest > `origin`.
pub fn resolve_remote(explicit: Option<&str>, manifest: &Manifest) -> String {
    explicit
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .or_else(|| manifest.default_remote())
        .unwrap_or(DEFAULT_REMOTE)
        .to_string()
}

/// Run the release flow for the project at `project_dir`.
pub fn release(
    project_dir: &Path,
    options: &ReleaseOptions,
    mut on_event: impl FnMut(ReleaseEvent),
) -> Result<ReleaseSummary, ReleaseError> {
    let manifest = Manifest::load(project_dir)?;
    let version = match manifest.version() {
        Some(v) if looks_like_semver(v) => v.to_string(),
        other => {
            return Err(ReleaseError::InvalidVersion {
                found: other.map(str::to_string),
            })
        }
    };
    let remote = resolve_remote(options.remote.as_deref(), &manifest);
    on_event(ReleaseEvent::Target {
        version: version.clone(),
        remote: remote.clone(),
    });

    let git = Git::new(project_dir);
    git.ensure_clean()?;

    git.delete_tag("v", Some(&remote))?;

    let branch = git.current_branch()?;
    on_event(ReleaseEvent::PushingBranch {
        branch: branch.clone(),
        remote: remote.clone(),
    });
    git.push(&remote, &branch)?;

    let tag = format!("v{}", version);
    if git.tag_exists(&tag)? {
        on_event(ReleaseEvent::TagExists { tag: tag.clone() });
    } else {
        git.create_annotated_tag(&tag, &format!("Release {}", tag))?;
        on_event(ReleaseEvent::TagCreated { tag: tag.clone() });
    }
    on_event(ReleaseEvent::PushingTag { tag: tag.clone() });
    git.push(&remote, &tag)?;

    match GitHub::detect(project_dir).filter(|_| options.github_release) {
        Some(gh) => {
            let created = gh.upsert_release(&tag, &tag, &format!("Release {}", tag))?;
            on_event(if created {
                ReleaseEvent::GitHubReleaseCreated { tag: tag.clone() }
            } else {
                ReleaseEvent::GitHubReleaseUpdated { tag: tag.clone() }
            });
        }
        None => on_event(ReleaseEvent::GitHubSkipped),
    }

    on_event(ReleaseEvent::Done { tag: tag.clone() });
    Ok(ReleaseSummary {
        version,
        tag,
        remote,
        branch,
    })
}
