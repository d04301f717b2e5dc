//! core::install
//!
//! Installs the managed Makefile and checks the external tools stage
//! scripts rely on.
//!
//! A managed Makefile starts with `# BMK MAKEFILE <version>`. Any other
//! existing Makefile belongs to the user and is never replaced.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The Makefile shipped with bmk.
pub const MAKEFILE: &str = include_str!("../../assets/Makefile");

/// First-line marker of a managed Makefile.
pub const SENTINEL: &str = "# BMK MAKEFILE";

pub const MAKEFILE_NAME: &str = "Makefile";

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("'{path}' exists but is not managed by bmk, leaving it alone")]
    Unmanaged { path: PathBuf },

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

/// What `install_makefile` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed {
        path: PathBuf,
        version: Option<String>,
    },
    Updated {
        path: PathBuf,
        from: Option<String>,
        to: Option<String>,
    },
}

/// Version from a sentinel line, `None` for unmanaged or unversioned files.
pub fn extract_version(first_line: &str) -> Option<String> {
    let rest = first_line.strip_prefix(SENTINEL)?.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

/// Version of the bundled Makefile.
pub fn bundled_version() -> Option<String> {
    extract_version(MAKEFILE.lines().next().unwrap_or_default())
}

/// Write the bundled Makefile into `project_dir`.
///
/// # Errors
///
/// `InstallError::Unmanaged` when a Makefile without the sentinel exists.
pub fn install_makefile(project_dir: &Path) -> Result<InstallOutcome, InstallError> {
    let path = project_dir.join(MAKEFILE_NAME);
    let to = bundled_version();

    let previous = if path.exists() {
        let existing = fs::read_to_string(&path).map_err(|e| InstallError::Read {
            path: path.clone(),
            source: e,
        })?;
        let first = existing.lines().next().unwrap_or_default();
        if !first.starts_with(SENTINEL) {
            return Err(InstallError::Unmanaged { path });
        }
        Some(extract_version(first))
    } else {
        None
    };

    fs::write(&path, MAKEFILE).map_err(|e| InstallError::Write {
        path: path.clone(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), "installed Makefile");

    Ok(match previous {
        Some(from) => InstallOutcome::Updated { path, from, to },
        None => InstallOutcome::Installed { path, version: to },
    })
}

/// Presence of one external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCheck {
    pub name: &'static str,
    pub path: Option<PathBuf>,
    pub install_hint: &'static str,
}

impl ToolCheck {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

/// Tools and install hints for the running platform.
pub fn required_tools() -> &'static [(&'static str, &'static str)] {
    if cfg!(windows) {
        &[
            (
                "winget",
                "pre-installed on Windows 11; on Windows 10 install \"App Installer\" from the Microsoft Store",
            ),
            ("git", "winget install Git.Git"),
            ("pwsh", "winget install Microsoft.PowerShell"),
        ]
    } else if cfg!(target_os = "macos") {
        &[
            ("git", "brew install git"),
            ("pwsh", "brew install powershell/tap/powershell"),
            ("shellcheck", "brew install shellcheck"),
            ("shfmt", "brew install shfmt"),
            ("bashate", "pip install bashate"),
        ]
    } else {
        &[
            ("git", "sudo apt install git"),
            (
                "pwsh",
                "https://learn.microsoft.com/en-us/powershell/scripting/install/installing-powershell-on-linux",
            ),
            ("shellcheck", "sudo apt install shellcheck"),
            ("shfmt", "sudo apt install shfmt"),
            ("bashate", "pip install bashate"),
        ]
    }
}

/// Look up every required tool on `PATH`.
pub fn check_prerequisites() -> Vec<ToolCheck> {
    required_tools()
        .iter()
        .map(|&(name, install_hint)| ToolCheck {
            name,
            path: which::which(name).ok(),
            install_hint,
        })
        .collect()
}

/// Human-readable prerequisites summary.
pub fn format_report(checks: &[ToolCheck]) -> String {
    let mut lines = vec!["Prerequisites:".to_string()];
    for tool in checks {
        if tool.found() {
            lines.push(format!("  ok      {}", tool.name));
        } else {
            lines.push(format!("  missing {}", tool.name));
            lines.push(format!("          install: {}", tool.install_hint));
        }
    }
    lines.join("\n")
}
