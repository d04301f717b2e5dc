//! core::changelog
//!
//! Inserts a release header into `CHANGELOG.md` on version bumps.
//!
//! With an `## [Unreleased]` section present, the new version header goes
//! directly below it, so the notes collected under Unreleased now belong to
//! the release and a fresh empty Unreleased section sits on top. Without
//! one, an Unreleased header plus the new version header are inserted before
//! the first existing version section. A changelog with neither is left
//! alone.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Changelog file name at the project root.
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

const UNRELEASED: &str = "## [Unreleased]";

/// Timestamp format used in version headers.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rewrite changelog text for a new release.
///
/// Returns `None` when the text has no place to put the header.
pub fn insert_release(content: &str, version: &str, timestamp: &str) -> Option<String> {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let header = format!("## [{version}] {timestamp}");

    if let Some(idx) = lines.iter().position(|l| is_unreleased(l)) {
        lines[idx] = UNRELEASED.to_string();
        lines.insert(idx + 1, String::new());
        lines.insert(idx + 2, header);
    } else {
        let idx = lines
            .iter()
            .position(|l| l.trim().starts_with("## [") && !is_unreleased(l))?;
        lines.splice(
            idx..idx,
            [UNRELEASED.to_string(), String::new(), header, String::new()],
        );
    }

    Some(lines.join("\n"))
}

fn is_unreleased(line: &str) -> bool {
    line.trim().to_lowercase().starts_with("## [unreleased]")
}

/// Update `CHANGELOG.md` in `project_dir`, if present.
///
/// Returns the path when the file was rewritten.
pub fn update_changelog(
    project_dir: &Path,
    version: &str,
    now: DateTime<Local>,
) -> std::io::Result<Option<PathBuf>> {
    let path = project_dir.join(CHANGELOG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    match insert_release(&content, version, &timestamp) {
        Some(updated) => {
            fs::write(&path, updated)?;
            Ok(Some(path))
        }
        None => {
            tracing::debug!(path = %path.display(), "no version headers in changelog");
            Ok(None)
        }
    }
}
