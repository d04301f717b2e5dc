//! cli::exit_codes
//!
//! Process exit codes.
//!
//! Codes follow POSIX/BSD conventions (`errno` values, `sysexits.h`), except
//! that a failing stage script passes its own code through.

use crate::core::config::ConfigError;
use crate::core::initconf::SyncError;
use crate::core::manifest::ManifestError;
use crate::core::version::VersionError;
use crate::stages::StageError;

/// Exit codes used by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    FileNotFound = 2,
    PermissionDenied = 13,
    InvalidArgument = 22,
    /// `EX_CONFIG`
    ConfigError = 78,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Map an error chain to a process exit code.
///
/// The first cause with a known mapping decides. Manifest failures are
/// general errors even when the underlying I/O error is a permission problem.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if is_manifest_error(cause) {
            return ExitCode::GeneralError.code();
        }
        if let Some(stage) = cause.downcast_ref::<StageError>() {
            return match stage {
                StageError::Failed { code, .. } => *code,
                StageError::NoScripts { .. } | StageError::OverrideDirMissing(_) => {
                    ExitCode::FileNotFound.code()
                }
                StageError::InvalidName(_) => ExitCode::InvalidArgument.code(),
                StageError::ReadDir { .. } | StageError::Spawn { .. } => {
                    ExitCode::GeneralError.code()
                }
            };
        }
        if let Some(config) = cause.downcast_ref::<ConfigError>() {
            return match config {
                ConfigError::InvalidOverride { .. }
                | ConfigError::InvalidProfile { .. }
                | ConfigError::UnknownSection(_) => ExitCode::InvalidArgument.code(),
                ConfigError::ParseError { .. } | ConfigError::InvalidValue(_) => {
                    ExitCode::ConfigError.code()
                }
                ConfigError::WriteError { source, .. } | ConfigError::ReadError { source, .. }
                    if source.kind() == std::io::ErrorKind::PermissionDenied =>
                {
                    ExitCode::PermissionDenied.code()
                }
                _ => ExitCode::GeneralError.code(),
            };
        }
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::PermissionDenied {
                return ExitCode::PermissionDenied.code();
            }
        }
    }
    ExitCode::GeneralError.code()
}

// Wrapping enums forward `source()` through `#[error(transparent)]`, so the
// manifest variant has to be matched on the wrapper itself.
fn is_manifest_error(cause: &(dyn std::error::Error + 'static)) -> bool {
    cause.is::<ManifestError>()
        || matches!(cause.downcast_ref::<SyncError>(), Some(SyncError::Manifest(_)))
        || matches!(
            cause.downcast_ref::<VersionError>(),
            Some(VersionError::Manifest(_))
        )
}
