//! git
//!
//! Single doorway to the `git` and `gh` executables.
//!
//! # Architecture
//!
//! Every git and GitHub CLI invocation in bmk goes through this module.
//! Commands run as subprocesses in the project directory; nothing here
//! parses `.git` internals.
//!
//! # Example
//!
//! ```no_run
//! use bmk::git::Git;
//! use std::path::Path;
//!
//! let git = Git::new(Path::new("."));
//! if git.is_clean()? {
//!     let branch = git.current_branch()?;
//!     git.push("origin", &branch)?;
//! }
//! # Ok::<(), bmk::git::GitError>(())
//! ```

mod gh;

pub use gh::GitHub;

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The executable could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The command ran and exited unsuccessfully.
    #[error("'{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Staged or unstaged changes present.
    #[error("working tree not clean in '{path}'; commit or stash changes first")]
    DirtyWorkingTree { path: PathBuf },
}

/// Handle for running git in one directory.
#[derive(Debug, Clone)]
pub struct Git {
    dir: PathBuf,
}

impl Git {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn output(&self, args: &[&str]) -> Result<Output, GitError> {
        tracing::debug!(dir = %self.dir.display(), ?args, "git");
        Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()
            .map_err(|e| GitError::Spawn {
                program: "git".to_string(),
                source: e,
            })
    }

    /// Run and require success; returns trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run and report only whether the command succeeded.
    fn check(&self, args: &[&str]) -> Result<bool, GitError> {
        Ok(self.output(args)?.status.success())
    }

    /// True when there are no staged and no unstaged changes to tracked files.
    pub fn is_clean(&self) -> Result<bool, GitError> {
        let unstaged = self.check(&["diff", "--quiet"])?;
        let staged = self.check(&["diff", "--cached", "--quiet"])?;
        Ok(unstaged && staged)
    }

    /// Fail with [`GitError::DirtyWorkingTree`] unless the tree is clean.
    pub fn ensure_clean(&self) -> Result<(), GitError> {
        if self.is_clean()? {
            Ok(())
        } else {
            Err(GitError::DirtyWorkingTree {
                path: self.dir.clone(),
            })
        }
    }

    pub fn current_branch(&self) -> Result<String, GitError> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn tag_exists(&self, name: &str) -> Result<bool, GitError> {
        let refname = format!("refs/tags/{}", name);
        self.check(&["rev-parse", "-q", "--verify", &refname])
    }

    pub fn create_annotated_tag(&self, name: &str, message: &str) -> Result<(), GitError> {
        self.run(&["tag", "-a", name, "-m", message]).map(|_| ())
    }

    /// Delete a tag locally and, when `remote` is given, on the remote too.
    ///
    /// Best effort: a tag that does not exist is not an error.
    pub fn delete_tag(&self, name: &str, remote: Option<&str>) -> Result<(), GitError> {
        self.check(&["tag", "-d", name])?;
        if let Some(remote) = remote {
            let refspec = format!(":refs/tags/{}", name);
            self.check(&["push", remote, &refspec])?;
        }
        Ok(())
    }

    pub fn push(&self, remote: &str, refname: &str) -> Result<(), GitError> {
        self.run(&["push", remote, refname]).map(|_| ())
    }
}
