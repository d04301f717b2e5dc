//! core::config::deploy
//!
//! Copies the embedded default configuration into layer locations.
//!
//! Existing files are left alone unless forced. On Unix, created
//! directories and files get the modes from `[deploy.permissions]`
//! (755/644 for app and host, 700/600 for user by default); explicit modes
//! from the caller win.

use std::path::{Path, PathBuf};

use clap::ValueEnum;

use super::schema::PermissionSettings;
use super::{write_atomic, ConfigError, ConfigPaths, DEFAULT_CONFIG};

/// A deployable layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DeployTarget {
    App,
    Host,
    User,
}

/// What happened to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployAction {
    Created,
    Overwritten,
    /// The file existed and `force` was not set.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployResult {
    pub target: DeployTarget,
    pub path: PathBuf,
    pub action: DeployAction,
}

impl DeployResult {
    pub fn deployed(&self) -> bool {
        self.action != DeployAction::Skipped
    }
}

/// Deployment switches.
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub force: bool,
    /// Apply Unix modes; `None` defers to `[deploy.permissions].enabled`.
    pub set_permissions: Option<bool>,
    pub dir_mode: Option<u32>,
    pub file_mode: Option<u32>,
}

/// Directory and file mode for a target, applying explicit overrides.
pub fn modes_for_target(
    target: DeployTarget,
    permissions: &PermissionSettings,
    options: &DeployOptions,
) -> Result<(u32, u32), ConfigError> {
    let (dir, file) = match target {
        DeployTarget::App => (&permissions.app_directory, &permissions.app_file),
        DeployTarget::Host => (&permissions.host_directory, &permissions.host_file),
        DeployTarget::User => (&permissions.user_directory, &permissions.user_file),
    };
    let dir_mode = match options.dir_mode {
        Some(mode) => mode,
        None => dir.to_mode()?,
    };
    let file_mode = match options.file_mode {
        Some(mode) => mode,
        None => file.to_mode()?,
    };
    Ok((dir_mode, file_mode))
}

/// File a target deploys to.
pub fn target_path(paths: &ConfigPaths, target: DeployTarget) -> Result<PathBuf, ConfigError> {
    match target {
        DeployTarget::App => Ok(paths.app.clone()),
        DeployTarget::Host => Ok(paths.host.clone()),
        DeployTarget::User => paths.user.clone().ok_or(ConfigError::NoConfigDir),
    }
}

/// Deploy the default configuration to each target.
///
/// Targets are processed in the order given; duplicates are deployed once.
pub fn deploy(
    paths: &ConfigPaths,
    targets: &[DeployTarget],
    permissions: &PermissionSettings,
    options: &DeployOptions,
) -> Result<Vec<DeployResult>, ConfigError> {
    let set_permissions = options.set_permissions.unwrap_or(permissions.enabled);
    let mut results = Vec::new();
    let mut seen = Vec::new();

    for &target in targets {
        if seen.contains(&target) {
            continue;
        }
        seen.push(target);

        let path = target_path(paths, target)?;
        let existed = path.exists();
        if existed && !options.force {
            tracing::info!(path = %path.display(), "config exists, skipping");
            results.push(DeployResult {
                target,
                path,
                action: DeployAction::Skipped,
            });
            continue;
        }

        let parent_existed = path.parent().map(Path::exists).unwrap_or(true);
        write_atomic(&path, DEFAULT_CONFIG)?;

        if set_permissions {
            let (dir_mode, file_mode) = modes_for_target(target, permissions, options)?;
            if !parent_existed {
                if let Some(parent) = path.parent() {
                    set_mode(parent, dir_mode)?;
                }
            }
            set_mode(&path, file_mode)?;
        }

        tracing::info!(?target, path = %path.display(), "deployed config");
        results.push(DeployResult {
            target,
            path,
            action: if existed {
                DeployAction::Overwritten
            } else {
                DeployAction::Created
            },
        });
    }

    Ok(results)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
        ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), ConfigError> {
    Ok(())
}
