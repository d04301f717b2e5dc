//! stage commands - Run staged shell/PowerShell scripts
//!
//! Built-in stages (`test`, `build`, `commit`, ...) search the override
//! directory and the bundled script directory. `custom` stages search the
//! override directory only.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::context::Context;
use crate::core::manifest::Manifest;
use crate::core::package_name::derive_package_name;
use crate::stages::{
    discover, is_outside_project, run_stage, validate_stage_name, ScriptDirs, StageEnv,
    StageError, OUTPUT_FORMAT_ENV, SCRIPTS_DIR_ENV,
};
use crate::ui::output;

/// Script prefix of each built-in stage.
pub mod prefix {
    pub const TEST: &str = "test";
    pub const TEST_INTEGRATION: &str = "test_integration";
    pub const BUILD: &str = "bld";
    pub const COMMIT: &str = "commit";
    pub const PUSH: &str = "push";
    pub const DEPS: &str = "deps";
    pub const DEPS_UPDATE: &str = "deps_update";
    pub const COVERAGE: &str = "cov";
    pub const RUN: &str = "run";
}

/// Run a built-in stage.
pub fn run_builtin(ctx: &Context, prefix: &str, args: &[String]) -> Result<()> {
    execute(ctx, prefix, &builtin_dirs(ctx), args, None)
}

/// Run a test stage, telling the scripts which tool output format to use.
pub fn run_tests(ctx: &Context, prefix: &str, human: bool, args: &[String]) -> Result<()> {
    let inherited = std::env::var(OUTPUT_FORMAT_ENV).ok();
    let format = test_output_format(human, inherited.as_deref());
    tracing::debug!(prefix, format, "test output format");
    execute(ctx, prefix, &builtin_dirs(ctx), args, Some(format.to_string()))
}

/// `text` with `--human`, else an inherited `BMK_OUTPUT_FORMAT`, else `json`.
pub fn test_output_format(human: bool, inherited: Option<&str>) -> &str {
    if human {
        return "text";
    }
    match inherited {
        Some(value) if !value.is_empty() => value,
        _ => "json",
    }
}

fn builtin_dirs(ctx: &Context) -> ScriptDirs {
    ScriptDirs {
        bundled: bundled_dir(ctx),
        override_dir: Some(override_dir(ctx)),
    }
}

/// Run a user-defined stage from the override directory.
pub fn custom(ctx: &Context, name: &str, args: &[String]) -> Result<()> {
    validate_stage_name(name)?;

    let dir = override_dir(ctx);
    if !dir.is_dir() {
        return Err(StageError::OverrideDirMissing(dir).into());
    }
    if is_outside_project(&ctx.project_dir, &dir) {
        output::warn(
            format!(
                "override directory '{}' is outside the project directory",
                dir.display()
            ),
            ctx.verbosity(),
        );
    }

    let dirs = ScriptDirs {
        bundled: None,
        override_dir: Some(dir),
    };
    execute(ctx, name, &dirs, args, None)
}

fn execute(
    ctx: &Context,
    prefix: &str,
    dirs: &ScriptDirs,
    args: &[String],
    output_format: Option<String>,
) -> Result<()> {
    let verbosity = ctx.verbosity();
    let scripts = discover(prefix, dirs)?;

    let env = StageEnv {
        project_dir: ctx.project_dir.clone(),
        prefix: prefix.to_string(),
        show_warnings: ctx.config.settings().bmk.show_warnings,
        override_dir: dirs.override_dir.clone(),
        package_name: package_name(ctx),
        output_format,
    };

    run_stage(&scripts, &env, args, |index, total, script| {
        output::detail(
            format!("[{}/{}] {} ({:?})", index, total, script.name, script.source),
            verbosity,
        );
    })?;
    Ok(())
}

/// Default override directory below the project root.
pub const DEFAULT_OVERRIDE_DIR: &str = "makescripts";

/// `[bmk].override_dir` (empty means the default), resolved against the
/// project directory.
fn override_dir(ctx: &Context) -> PathBuf {
    let dir = ctx
        .config
        .settings()
        .bmk
        .override_dir()
        .unwrap_or(DEFAULT_OVERRIDE_DIR);
    ctx.resolve(Path::new(dir))
}

/// `[bmk].scripts_dir`, else `BMK_SCRIPTS_DIR`.
fn bundled_dir(ctx: &Context) -> Option<PathBuf> {
    match ctx.config.settings().bmk.scripts_dir() {
        Some(dir) => Some(ctx.resolve(Path::new(dir))),
        None => std::env::var_os(SCRIPTS_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from),
    }
}

/// Configured package name, else the derived one when derivable.
fn package_name(ctx: &Context) -> Option<String> {
    if let Some(name) = ctx.config.settings().bmk.package_name() {
        return Some(name.to_string());
    }
    let manifest = Manifest::load(&ctx.project_dir)
        .map_err(|e| tracing::debug!(error = %e, "no manifest for package name"))
        .ok()?;
    derive_package_name(&manifest)
        .map_err(|e| tracing::debug!(error = %e, "package name not derivable"))
        .ok()
}
