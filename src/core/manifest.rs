//! core::manifest
//!
//! Read-only view of a project's `pyproject.toml`.
//!
//! # Consumed Keys
//!
//! - `project.name`, `project.version`, `project.dependencies`
//! - `project.scripts` (kept in file order)
//! - `tool.hatch.build.targets.wheel.packages`
//! - `tool.clean.patterns`
//! - `tool.git.default-remote`
//!
//! Everything else in the file is ignored but preserved in [`Manifest::raw`].
//!
//! # Example
//!
//! ```
//! use bmk::core::manifest::Manifest;
//!
//! let manifest = Manifest::parse(r#"
//! [project]
//! name = "my-tool"
//! version = "1.2.3"
//! "#).unwrap();
//!
//! assert_eq!(manifest.project.name.as_deref(), Some("my-tool"));
//! assert_eq!(manifest.version(), Some("1.2.3"));
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Conventional manifest file name at the project root.
pub const MANIFEST_FILE: &str = "pyproject.toml";

/// Errors from reading the manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("no [project].version in '{path}'")]
    MissingVersion { path: PathBuf },
}

/// Parsed `pyproject.toml`.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// The `[project]` table.
    pub project: ProjectTable,
    /// The subset of `[tool]` that bmk reads.
    pub tool: ToolTable,
    /// The full document.
    pub raw: toml::Table,
}

/// The `[project]` table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectTable {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    /// Console scripts in file order. Values are normally strings.
    pub scripts: toml::Table,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolTable {
    pub hatch: HatchTable,
    pub clean: CleanTable,
    pub git: GitTable,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HatchTable {
    pub build: HatchBuild,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HatchBuild {
    pub targets: HatchTargets,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HatchTargets {
    pub wheel: WheelTarget,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct WheelTarget {
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleanTable {
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GitTable {
    #[serde(rename = "default-remote")]
    pub default_remote: Option<String>,
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    project: ProjectTable,
    #[serde(default)]
    tool: ToolTable,
}

impl Manifest {
    /// Path of the manifest inside a project root.
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(MANIFEST_FILE)
    }

    /// Load `pyproject.toml` from a project root.
    pub fn load(project_dir: &Path) -> Result<Self, ManifestError> {
        Self::load_file(&Self::path_in(project_dir))
    }

    /// Load a manifest from an explicit file path.
    pub fn load_file(path: &Path) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents).map_err(|message| ManifestError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse manifest text.
    ///
    /// Returns the TOML error message on failure so callers can attach a path.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let raw: toml::Table = toml::from_str(contents).map_err(|e| e.to_string())?;
        let doc: Document = toml::from_str(contents).map_err(|e| e.to_string())?;
        Ok(Self {
            project: doc.project,
            tool: doc.tool,
            raw,
        })
    }

    /// The project version, if present and non-empty.
    pub fn version(&self) -> Option<&str> {
        self.project.version.as_deref().filter(|v| !v.is_empty())
    }

    /// The project name, if present and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.project.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Declared wheel packages (`tool.hatch.build.targets.wheel.packages`).
    pub fn wheel_packages(&self) -> &[String] {
        &self.tool.hatch.build.targets.wheel.packages
    }

    /// Console script entry points in file order, skipping non-string values.
    pub fn script_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.project
            .scripts
            .iter()
            .filter_map(|(name, value)| value.as_str().map(|spec| (name.as_str(), spec)))
    }

    /// `tool.git.default-remote`, trimmed, if non-blank.
    pub fn default_remote(&self) -> Option<&str> {
        self.tool
            .git
            .default_remote
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = r#"
[project]
name = "demo-app"
version = "0.4.1"
description = "Demo"
dependencies = ["rich>=13", "click"]

[project.scripts]
zeta = "demo_app.cli:main"
alpha = "demo_app.other:run"

[tool.hatch.build.targets.wheel]
packages = ["src/demo_app"]

[tool.clean]
patterns = ["build", "dist"]

[tool.git]
default-remote = " upstream "

[tool.ruff]
line-length = 120
"#;

    #[test]
    fn parse_full_manifest() {
        let m = Manifest::parse(FULL).unwrap();
        assert_eq!(m.name(), Some("demo-app"));
        assert_eq!(m.version(), Some("0.4.1"));
        assert_eq!(m.project.dependencies, vec!["rich>=13", "click"]);
        assert_eq!(m.wheel_packages(), ["src/demo_app"]);
        assert_eq!(m.tool.clean.patterns, vec!["build", "dist"]);
        assert_eq!(m.default_remote(), Some("upstream"));
        assert!(m.raw.contains_key("tool"));
    }

    #[test]
    fn scripts_keep_file_order() {
        let m = Manifest::parse(FULL).unwrap();
        let names: Vec<_> = m.script_entries().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let m = Manifest::parse("").unwrap();
        assert_eq!(m.name(), None);
        assert_eq!(m.version(), None);
        assert!(m.wheel_packages().is_empty());
        assert_eq!(m.default_remote(), None);
    }

    #[test]
    fn empty_version_is_none() {
        let m = Manifest::parse("[project]\nversion = \"\"\n").unwrap();
        assert_eq!(m.version(), None);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), "[project\nname = 1").unwrap();

        let err = Manifest::load(temp.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let err = Manifest::load(temp.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    #[test]
    fn non_string_script_values_are_skipped() {
        let m = Manifest::parse(
            r#"
[project.scripts]
weird = 3
ok = "pkg:main"
"#,
        )
        .unwrap();
        let entries: Vec<_> = m.script_entries().collect();
        assert_eq!(entries, vec![("ok", "pkg:main")]);
    }
}
