//! cli::context
//!
//! Per-invocation state shared by command handlers.

use std::path::{Path, PathBuf};

use crate::core::config::Config;
use crate::ui::output::Verbosity;

/// Execution context for a command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Project directory (`--cwd`, else the current directory).
    pub project_dir: PathBuf,
    pub debug: bool,
    pub quiet: bool,
    /// Merged configuration.
    pub config: Config,
}

impl Context {
    pub fn new(project_dir: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            project_dir: project_dir.into(),
            debug: false,
            quiet: false,
            config,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Resolve `dir` against the project directory.
    pub fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.project_dir.join(dir)
        }
    }
}
