//! git::gh
//!
//! GitHub releases through the `gh` CLI.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::GitError;

/// The `gh` executable, if installed.
#[derive(Debug, Clone)]
pub struct GitHub {
    program: PathBuf,
    dir: PathBuf,
}

impl GitHub {
    /// Locate `gh` on `PATH`. Returns `None` when it is not installed.
    pub fn detect(dir: &Path) -> Option<Self> {
        which::which("gh").ok().map(|program| Self {
            program,
            dir: dir.to_path_buf(),
        })
    }

    fn status(&self, args: &[&str]) -> Result<bool, GitError> {
        tracing::debug!(?args, "gh");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.dir)
            .output()
            .map_err(|e| GitError::Spawn {
                program: "gh".to_string(),
                source: e,
            })?;
        if !output.status.success() {
            tracing::debug!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "gh exited unsuccessfully"
            );
        }
        Ok(output.status.success())
    }

    pub fn release_exists(&self, tag: &str) -> Result<bool, GitError> {
        self.status(&["release", "view", tag])
    }

    /// Create the release, or edit it when it already exists.
    ///
    /// Returns true when a new release was created. Failures of the
    /// create/edit call are logged, not propagated.
    pub fn upsert_release(&self, tag: &str, title: &str, notes: &str) -> Result<bool, GitError> {
        if self.release_exists(tag)? {
            if !self.status(&["release", "edit", tag, "-t", title, "-n", notes])? {
                tracing::warn!(tag, "gh release edit failed");
            }
            Ok(false)
        } else {
            if !self.status(&["release", "create", tag, "-t", title, "-n", notes])? {
                tracing::warn!(tag, "gh release create failed");
            }
            Ok(true)
        }
    }
}
