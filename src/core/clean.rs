//! core::clean
//!
//! Removal of build artifacts and tool caches.
//!
//! Patterns come from `[tool.clean].patterns` in the manifest, or from
//! [`FALLBACK_PATTERNS`] when the manifest is missing or declares none.
//! They are glob patterns relative to the project root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use thiserror::Error;

use super::manifest::{Manifest, ManifestError};

/// Patterns used when the project declares none.
pub const FALLBACK_PATTERNS: &[&str] = &[
    ".hypothesis",
    ".import_linter_cache",
    ".pytest_cache",
    ".ruff_cache",
    ".pyright",
    ".mypy_cache",
    ".tox",
    ".nox",
    ".eggs",
    "*.egg-info",
    "build",
    "dist",
    "htmlcov",
    ".coverage",
    "coverage.xml",
    "codecov.sh",
    ".cache",
    "result",
];

#[derive(Debug, Error)]
pub enum CleanError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("invalid clean pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("failed to remove '{path}': {source}")]
    Remove { path: PathBuf, source: io::Error },
}

/// What a matched path was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// A path matched by a clean pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Outcome of a clean run.
#[derive(Debug, Default)]
pub struct CleanReport {
    /// Entries removed, or that would be removed in a dry run.
    pub entries: Vec<CleanEntry>,
    pub dry_run: bool,
}

impl CleanReport {
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

/// Patterns configured for the project.
pub fn clean_patterns(project_dir: &Path) -> Result<Vec<String>, CleanError> {
    let path = Manifest::path_in(project_dir);
    if !path.exists() {
        return Ok(fallback());
    }

    let manifest = Manifest::load_file(&path)?;
    if manifest.tool.clean.patterns.is_empty() {
        Ok(fallback())
    } else {
        Ok(manifest.tool.clean.patterns)
    }
}

fn fallback() -> Vec<String> {
    FALLBACK_PATTERNS.iter().map(|p| p.to_string()).collect()
}

/// Remove everything matching `patterns` below `project_dir`.
pub fn clean(
    project_dir: &Path,
    patterns: &[String],
    dry_run: bool,
) -> Result<CleanReport, CleanError> {
    let mut report = CleanReport {
        entries: Vec::new(),
        dry_run,
    };

    let root = Pattern::escape(&project_dir.to_string_lossy());
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    for pattern in patterns {
        let full = format!("{}/{}", root, pattern);
        let matches = glob::glob_with(&full, options).map_err(|e| CleanError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        // Unreadable entries are skipped; they cannot be removed either.
        for path in matches.flatten() {
            let Ok(meta) = fs::symlink_metadata(&path) else {
                continue;
            };
            let kind = if meta.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };

            if !dry_run && !remove(&path, kind)? {
                continue;
            }
            tracing::debug!(path = %path.display(), dry_run, "clean");
            report.entries.push(CleanEntry { path, kind });
        }
    }

    Ok(report)
}

/// Returns false when the path vanished before it could be removed.
fn remove(path: &Path, kind: EntryKind) -> Result<bool, CleanError> {
    let result = match kind {
        EntryKind::Directory => fs::remove_dir_all(path),
        EntryKind::File => fs::remove_file(path),
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CleanError::Remove {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
