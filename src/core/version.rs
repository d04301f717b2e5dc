//! core::version
//!
//! Semantic version bumping for the project manifest.
//!
//! # Format
//!
//! Versions are exactly three dot-separated non-negative integers
//! (`MAJOR.MINOR.PATCH`). Pre-release and build suffixes are rejected.
//!
//! # Writing
//!
//! The manifest is never re-serialized. The version is read through
//! [`Manifest`] and then the first `version = "<old>"` occurrence in the raw
//! text is replaced, so comments, ordering and quoting survive the bump.
//!
//! # Example
//!
//! ```
//! use bmk::core::version::{BumpPart, Version};
//!
//! let v: Version = "1.2.3".parse().unwrap();
//! assert_eq!(v.bump(BumpPart::Minor).unwrap().to_string(), "1.3.0");
//! assert!("1.2".parse::<Version>().is_err());
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

use super::manifest::{Manifest, ManifestError};

/// Errors from version handling.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("invalid version format: '{0}' (expected MAJOR.MINOR.PATCH)")]
    InvalidVersion(String),

    #[error("cannot bump {part} of {version}: component would overflow")]
    Overflow { version: Version, part: &'static str },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("could not find version = \"{version}\" in '{path}'")]
    VersionLineNotFound { path: PathBuf, version: String },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A strict `MAJOR.MINOR.PATCH` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// Which component to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BumpPart {
    #[value(alias = "ma")]
    Major,
    #[value(alias = "m")]
    Minor,
    #[value(alias = "p")]
    Patch,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Increment one component and reset the lower ones.
    ///
    /// # Errors
    ///
    /// `VersionError::Overflow` when the component is already `u64::MAX`.
    pub fn bump(self, part: BumpPart) -> Result<Self, VersionError> {
        let overflow = |part| VersionError::Overflow {
            version: self,
            part,
        };
        match part {
            BumpPart::Major => self
                .major
                .checked_add(1)
                .map(|major| Self::new(major, 0, 0))
                .ok_or_else(|| overflow("major")),
            BumpPart::Minor => self
                .minor
                .checked_add(1)
                .map(|minor| Self::new(self.major, minor, 0))
                .ok_or_else(|| overflow("minor")),
            BumpPart::Patch => self
                .patch
                .checked_add(1)
                .map(|patch| Self::new(self.major, self.minor, patch))
                .ok_or_else(|| overflow("patch")),
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::InvalidVersion(s.to_string());

        let mut parts = s.split('.');
        let mut next = || -> Result<u64, VersionError> {
            let part = parts.next().ok_or_else(invalid)?;
            // u64::from_str accepts a leading '+'
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        let version = Version::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Result of rewriting the manifest version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub old: String,
    pub new: String,
}

/// Read the current manifest version, failing when it is absent.
pub fn current_version(project_dir: &Path) -> Result<String, VersionError> {
    let manifest = Manifest::load(project_dir)?;
    manifest
        .version()
        .map(str::to_string)
        .ok_or_else(|| {
            ManifestError::MissingVersion {
                path: Manifest::path_in(project_dir),
            }
            .into()
        })
}

/// Replace the version in `pyproject.toml` text.
///
/// Tries the double-quoted form first, then the single-quoted one. Only the
/// first occurrence changes.
pub fn replace_version_line(content: &str, old: &str, new: &str) -> Option<String> {
    for quote in ['"', '\''] {
        let old_line = format!("version = {quote}{old}{quote}");
        if content.contains(&old_line) {
            let new_line = format!("version = {quote}{new}{quote}");
            return Some(content.replacen(&old_line, &new_line, 1));
        }
    }
    None
}

/// Write `new_version` into the project manifest.
pub fn update_pyproject(project_dir: &Path, new_version: &str) -> Result<VersionChange, VersionError> {
    let path = Manifest::path_in(project_dir);
    let old = current_version(project_dir)?;

    let content = fs::read_to_string(&path).map_err(|e| ManifestError::Read {
        path: path.clone(),
        source: e,
    })?;

    let updated = replace_version_line(&content, &old, new_version).ok_or_else(|| {
        VersionError::VersionLineNotFound {
            path: path.clone(),
            version: old.clone(),
        }
    })?;

    fs::write(&path, updated).map_err(|e| VersionError::Write {
        path: path.clone(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), %old, new = new_version, "manifest version updated");

    Ok(VersionChange {
        old,
        new: new_version.to_string(),
    })
}
