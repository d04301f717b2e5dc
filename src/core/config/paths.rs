//! core::config::paths
//!
//! Centralized routing for configuration file locations.
//!
//! # Layout
//!
//! | Layer | Linux | macOS | Windows |
//! |-------|-------|-------|---------|
//! | app   | `/etc/xdg/bmk/config.toml` | `/Library/Application Support/bmk/config.toml` | `%ProgramData%\bmk\config.toml` |
//! | host  | `/etc/xdg/bmk/hosts/<host>.toml` | `.../bmk/hosts/<host>.toml` | `%ProgramData%\bmk\hosts\<host>.toml` |
//! | user  | `$XDG_CONFIG_HOME/bmk/config.toml` | `~/Library/Application Support/bmk/config.toml` | `%APPDATA%\bmk\config.toml` |
//! | project | `<project>/.bmk.toml` | same | same |
//!
//! With a profile, `profile/<name>/` is inserted below the `bmk` directory
//! of the app, host and user layers.
//!
//! # Example
//!
//! ```
//! use bmk::core::config::paths::ConfigPaths;
//! use std::path::{Path, PathBuf};
//!
//! let paths = ConfigPaths::from_dirs(
//!     Path::new("/etc/xdg/bmk"),
//!     Some(Path::new("/home/me/.config/bmk")),
//!     "build01",
//!     Some("ci"),
//! ).unwrap();
//!
//! assert_eq!(paths.app, PathBuf::from("/etc/xdg/bmk/profile/ci/config.toml"));
//! assert_eq!(paths.host, PathBuf::from("/etc/xdg/bmk/profile/ci/hosts/build01.toml"));
//! ```

use std::path::{Path, PathBuf};

use super::ConfigError;

/// Directory and file name slug.
pub const SLUG: &str = "bmk";

/// File name of app and user layer files.
pub const CONFIG_FILE: &str = "config.toml";

/// Project layer file name at the project root.
pub const PROJECT_CONFIG_FILE: &str = ".bmk.toml";

/// Longest accepted profile name.
pub const MAX_PROFILE_LENGTH: usize = 64;

const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Resolved file locations of the machine-wide and user layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub app: PathBuf,
    pub host: PathBuf,
    /// `None` when the platform has no user config directory.
    pub user: Option<PathBuf>,
    pub profile: Option<String>,
}

impl ConfigPaths {
    /// Locations for the running platform.
    pub fn platform(profile: Option<&str>) -> Result<Self, ConfigError> {
        let user = dirs::config_dir().map(|d| d.join(SLUG));
        Self::from_dirs(&system_dir(), user.as_deref(), &current_hostname(), profile)
    }

    /// Locations below explicit app and user directories.
    pub fn from_dirs(
        app_dir: &Path,
        user_dir: Option<&Path>,
        hostname: &str,
        profile: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(name) = profile {
            validate_profile(name)?;
        }
        let scoped = |dir: &Path| match profile {
            Some(name) => dir.join("profile").join(name),
            None => dir.to_path_buf(),
        };

        let app_base = scoped(app_dir);
        Ok(Self {
            app: app_base.join(CONFIG_FILE),
            host: app_base.join("hosts").join(format!("{}.toml", hostname)),
            user: user_dir.map(|d| scoped(d).join(CONFIG_FILE)),
            profile: profile.map(str::to_string),
        })
    }

    /// Project layer file for a project root.
    pub fn project(project_dir: &Path) -> PathBuf {
        project_dir.join(PROJECT_CONFIG_FILE)
    }
}

#[cfg(target_os = "linux")]
fn system_dir() -> PathBuf {
    PathBuf::from("/etc/xdg").join(SLUG)
}

#[cfg(target_os = "macos")]
fn system_dir() -> PathBuf {
    PathBuf::from("/Library/Application Support").join(SLUG)
}

#[cfg(windows)]
fn system_dir() -> PathBuf {
    std::env::var_os("ProgramData")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"))
        .join(SLUG)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
fn system_dir() -> PathBuf {
    PathBuf::from("/etc").join(SLUG)
}

/// Host name used for the host layer file.
pub fn current_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Check a profile name.
///
/// Accepted: 1 to 64 characters from `[A-Za-z0-9_-]`, not starting with
/// `-`, and not a Windows device name.
pub fn validate_profile(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidProfile {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("profile name cannot be empty"));
    }
    if name.len() > MAX_PROFILE_LENGTH {
        return Err(invalid("profile name exceeds 64 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid(
            "profile name may only contain letters, digits, '-' and '_'",
        ));
    }
    if name.starts_with('-') {
        return Err(invalid("profile name cannot start with '-'"));
    }
    if WINDOWS_RESERVED.contains(&name.to_ascii_uppercase().as_str()) {
        return Err(invalid("profile name is a reserved device name"));
    }
    Ok(())
}
