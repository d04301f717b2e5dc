//! core::initconf
//!
//! Keeps `src/<package>/__init__conf__.py` in step with the manifest version.
//!
//! The metadata file holds one `version = "<value>"` assignment among other
//! constants. Only the quoted value of the first such line is rewritten and
//! the file is written only when its content actually changes, so repeated
//! syncs are no-ops.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

use super::manifest::{Manifest, ManifestError};
use super::package_name::{derive_package_name, PackageNameError};

/// Name of the metadata file inside the package directory.
pub const INITCONF_FILE: &str = "__init__conf__.py";

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(version\s*=\s*")[^"]*(")"#).expect("version line pattern is valid")
});

/// Errors from syncing the metadata file.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    PackageName(#[from] PackageNameError),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of a sync that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The file was rewritten with the manifest version.
    Synced { version: String, path: PathBuf },
    /// The file already carried the manifest version.
    AlreadyInSync { path: PathBuf },
    /// No metadata file at the derived location.
    NotPresent { path: PathBuf },
    /// The manifest has no `[project].version`.
    MissingVersion,
}

impl SyncOutcome {
    /// True when the metadata file was written.
    pub fn changed(&self) -> bool {
        matches!(self, SyncOutcome::Synced { .. })
    }
}

/// Location of the metadata file for a package.
pub fn initconf_path(project_dir: &Path, package_name: &str) -> PathBuf {
    project_dir.join("src").join(package_name).join(INITCONF_FILE)
}

/// Replace the value of the first `version = "..."` line.
///
/// Returns the text unchanged when no line matches.
///
/// # Example
///
/// ```
/// use bmk::core::initconf::patch_version;
///
/// let text = "name = \"demo\"\nversion = \"1.0.0\"\n";
/// assert_eq!(patch_version(text, "1.2.3"), "name = \"demo\"\nversion = \"1.2.3\"\n");
/// ```
pub fn patch_version(content: &str, version: &str) -> String {
    VERSION_LINE
        .replacen(content, 1, |caps: &Captures| {
            format!("{}{}{}", &caps[1], version, &caps[2])
        })
        .into_owned()
}

/// Patch the metadata file of the project at `project_dir` to the manifest version.
pub fn sync_initconf_version(project_dir: &Path) -> Result<SyncOutcome, SyncError> {
    let manifest = Manifest::load(project_dir)?;
    sync_with_manifest(project_dir, &manifest)
}

/// Same as [`sync_initconf_version`] with an already loaded manifest.
pub fn sync_with_manifest(
    project_dir: &Path,
    manifest: &Manifest,
) -> Result<SyncOutcome, SyncError> {
    let Some(version) = manifest.version() else {
        tracing::warn!(project = %project_dir.display(), "no [project].version in manifest");
        return Ok(SyncOutcome::MissingVersion);
    };

    let package_name = derive_package_name(manifest)?;
    let path = initconf_path(project_dir, &package_name);

    if !path.exists() {
        tracing::debug!(path = %path.display(), "metadata file not present, nothing to sync");
        return Ok(SyncOutcome::NotPresent { path });
    }

    let content = fs::read_to_string(&path).map_err(|e| SyncError::Read {
        path: path.clone(),
        source: e,
    })?;

    let patched = patch_version(&content, version);
    if patched == content {
        return Ok(SyncOutcome::AlreadyInSync { path });
    }

    fs::write(&path, patched).map_err(|e| SyncError::Write {
        path: path.clone(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), version, "synced metadata version");

    Ok(SyncOutcome::Synced {
        version: version.to_string(),
        path,
    })
}
