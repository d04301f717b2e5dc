//! stages
//!
//! Discovery and execution of staged scripts.
//!
//! # Naming
//!
//! A stage is a command prefix such as `test` or `bld`. Its scripts are files
//! named `<prefix>_<digits>_<anything>.sh` (`.ps1` on Windows), for example
//! `test_010_lint.sh` and `test_020_pytest.sh`.
//!
//! # Resolution
//!
//! Scripts are collected from the bundled directory and the project's
//! override directory. A file name present in both resolves to the override
//! copy. The merged set runs in file name order.
//!
//! # Execution
//!
//! Scripts run one at a time in the project directory with inherited stdio.
//! The first failing script stops the stage and its exit code becomes the
//! stage result; a script killed by signal N reports 128+N.
//!
//! # Environment
//!
//! | Variable | Value |
//! |----------|-------|
//! | `BMK_PROJECT_DIR` | project root |
//! | `BMK_COMMAND_PREFIX` | stage prefix |
//! | `BMK_SHOW_WARNINGS` | `1` or `0` |
//! | `BMK_OVERRIDE_DIR` | override directory, when configured |
//! | `BMK_PACKAGE_NAME` | package name, when known |
//! | `BMK_STAGE_INDEX` / `BMK_STAGE_TOTAL` | 1-based position in the stage |

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Environment variable naming the bundled script directory.
pub const SCRIPTS_DIR_ENV: &str = "BMK_SCRIPTS_DIR";

/// Tool output format requested from test scripts (`json` or `text`).
pub const OUTPUT_FORMAT_ENV: &str = "BMK_OUTPUT_FORMAT";

static STAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("stage name pattern is valid")
});

#[derive(Debug, Error)]
pub enum StageError {
    #[error(
        "invalid command name '{0}': only letters, digits, '-' and '_' are allowed, starting with a letter or digit"
    )]
    InvalidName(String),

    #[error("override directory '{0}' does not exist")]
    OverrideDirMissing(PathBuf),

    #[error("no '{}' stage scripts found (searched: {})", .prefix, format_dirs(.searched))]
    NoScripts {
        prefix: String,
        searched: Vec<PathBuf>,
    },

    #[error("failed to read script directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to start '{script}': {source}")]
    Spawn {
        script: PathBuf,
        source: std::io::Error,
    },

    #[error("stage script '{script}' failed with exit code {code}")]
    Failed { script: PathBuf, code: i32 },
}

fn format_dirs(dirs: &[PathBuf]) -> String {
    if dirs.is_empty() {
        return "no directories configured".to_string();
    }
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where a script was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSource {
    Bundled,
    Override,
}

/// A resolved stage script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageScript {
    pub name: String,
    pub path: PathBuf,
    pub source: ScriptSource,
}

/// Directories a stage is collected from.
#[derive(Debug, Clone, Default)]
pub struct ScriptDirs {
    pub bundled: Option<PathBuf>,
    pub override_dir: Option<PathBuf>,
}

impl ScriptDirs {
    fn searched(&self) -> Vec<PathBuf> {
        self.override_dir
            .iter()
            .chain(self.bundled.iter())
            .cloned()
            .collect()
    }
}

/// Values exported to every script of a stage.
#[derive(Debug, Clone)]
pub struct StageEnv {
    pub project_dir: PathBuf,
    pub prefix: String,
    pub show_warnings: bool,
    pub override_dir: Option<PathBuf>,
    pub package_name: Option<String>,
    /// Exported as `BMK_OUTPUT_FORMAT` when set; test stages only.
    pub output_format: Option<String>,
}

/// Script extension for the running platform.
pub fn script_extension() -> &'static str {
    if cfg!(windows) {
        "ps1"
    } else {
        "sh"
    }
}

/// Check a user-supplied stage name.
pub fn validate_stage_name(name: &str) -> Result<(), StageError> {
    if STAGE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(StageError::InvalidName(name.to_string()))
    }
}

/// Whether `file_name` is a script of the stage `prefix`.
pub fn is_stage_script(file_name: &str, prefix: &str, extension: &str) -> bool {
    let Some(rest) = file_name
        .strip_prefix(prefix)
        .and_then(|r| r.strip_prefix('_'))
    else {
        return false;
    };
    let Some(body) = rest
        .strip_suffix(extension)
        .and_then(|r| r.strip_suffix('.'))
    else {
        return false;
    };
    let digits = body.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && body[digits..].starts_with('_')
}

/// Collect the scripts of a stage, override copies winning by file name.
pub fn discover(prefix: &str, dirs: &ScriptDirs) -> Result<Vec<StageScript>, StageError> {
    let extension = script_extension();
    let mut found: BTreeMap<String, StageScript> = BTreeMap::new();

    let ordered = [
        (ScriptSource::Bundled, dirs.bundled.as_ref()),
        (ScriptSource::Override, dirs.override_dir.as_ref()),
    ];
    for (source, dir) in ordered {
        let Some(dir) = dir.filter(|d| d.is_dir()) else {
            continue;
        };
        let entries = fs::read_dir(dir).map_err(|e| StageError::ReadDir {
            path: dir.clone(),
            source: e,
        })?;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_stage_script(&name, prefix, extension) || !entry.path().is_file() {
                continue;
            }
            found.insert(
                name.clone(),
                StageScript {
                    name,
                    path: entry.path(),
                    source,
                },
            );
        }
    }

    if found.is_empty() {
        return Err(StageError::NoScripts {
            prefix: prefix.to_string(),
            searched: dirs.searched(),
        });
    }
    Ok(found.into_values().collect())
}

/// Exit code of a finished script, mapping signal N to 128+N.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

fn command_for(script: &Path) -> Command {
    let is_powershell = script
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ps1"));
    if is_powershell {
        let mut cmd = Command::new("pwsh");
        cmd.args(["-NoProfile", "-NonInteractive", "-File"]).arg(script);
        cmd
    } else {
        let mut cmd = Command::new("bash");
        cmd.arg(script);
        cmd
    }
}

/// Run scripts in order, stopping at the first failure.
///
/// `on_start` is called before each script with its 1-based index and the
/// stage size.
pub fn run_stage(
    scripts: &[StageScript],
    env: &StageEnv,
    args: &[String],
    mut on_start: impl FnMut(usize, usize, &StageScript),
) -> Result<(), StageError> {
    let total = scripts.len();
    for (i, script) in scripts.iter().enumerate() {
        let index = i + 1;
        on_start(index, total, script);
        tracing::debug!(script = %script.path.display(), index, total, "running stage script");

        let mut cmd = command_for(&script.path);
        cmd.args(args)
            .current_dir(&env.project_dir)
            .env("BMK_PROJECT_DIR", &env.project_dir)
            .env("BMK_COMMAND_PREFIX", &env.prefix)
            .env("BMK_SHOW_WARNINGS", if env.show_warnings { "1" } else { "0" })
            .env("BMK_STAGE_INDEX", index.to_string())
            .env("BMK_STAGE_TOTAL", total.to_string());
        if let Some(dir) = &env.override_dir {
            cmd.env("BMK_OVERRIDE_DIR", dir);
        }
        if let Some(name) = &env.package_name {
            cmd.env("BMK_PACKAGE_NAME", name);
        }
        if let Some(format) = &env.output_format {
            cmd.env(OUTPUT_FORMAT_ENV, format);
        }

        let status = cmd.status().map_err(|e| StageError::Spawn {
            script: script.path.clone(),
            source: e,
        })?;
        if !status.success() {
            return Err(StageError::Failed {
                script: script.path.clone(),
                code: exit_code(status),
            });
        }
    }
    Ok(())
}

/// Whether `dir` lies outside `project_dir`.
pub fn is_outside_project(project_dir: &Path, dir: &Path) -> bool {
    let project = project_dir
        .canonicalize()
        .unwrap_or_else(|_| project_dir.to_path_buf());
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    !dir.starts_with(project)
}
