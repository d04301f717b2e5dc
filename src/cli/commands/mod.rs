//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves its inputs from arguments and the [`Context`]
//! 2. Calls into [`crate::core`] or [`crate::stages`]
//! 3. Formats and displays output
//!
//! Handlers return `anyhow::Result`; the binary maps the error chain to an
//! exit code (see [`crate::cli::exit_codes`]).

mod bump;
mod clean;
mod completion;
mod config_cmd;
mod info;
mod install;
mod package_name;
mod release;
mod stage;
mod sync_initconf;

// Re-export command functions for testing and direct invocation
pub use bump::bump;
pub use clean::clean;
pub use completion::{completion, write_completion};
pub use config_cmd::{
    deploy as config_deploy, generate_examples as config_generate_examples, show as config_show,
};
pub use info::info;
pub use install::install;
pub use package_name::package_name;
pub use release::release;
pub use stage::{
    custom, prefix, run_builtin, run_tests, test_output_format, DEFAULT_OVERRIDE_DIR,
};
pub use sync_initconf::sync_initconf;

use anyhow::Result;

use crate::cli::args::Command;
use crate::cli::context::Context;
use crate::core::config::deploy::DeployOptions;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        // Project metadata
        Command::SyncInitconf { project_dir } => {
            sync_initconf::sync_initconf(ctx, project_dir.as_deref())
        }
        Command::PackageName { project_dir } => {
            package_name::package_name(ctx, project_dir.as_deref())
        }
        Command::Bump { part } => bump::bump(ctx, part),

        // Stages
        Command::Test { human, args } => stage::run_tests(ctx, prefix::TEST, human, &args),
        Command::TestIntegration { human, args } => {
            stage::run_tests(ctx, prefix::TEST_INTEGRATION, human, &args)
        }
        Command::Build => stage::run_builtin(ctx, prefix::BUILD, &[]),
        Command::Commit { message } => stage::run_builtin(ctx, prefix::COMMIT, &message),
        Command::Push { message } => stage::run_builtin(ctx, prefix::PUSH, &message),
        Command::Dependencies { update } => {
            let stage_prefix = if update {
                prefix::DEPS_UPDATE
            } else {
                prefix::DEPS
            };
            stage::run_builtin(ctx, stage_prefix, &[])
        }
        Command::Coverage => stage::run_builtin(ctx, prefix::COVERAGE, &[]),
        Command::Run { args } => stage::run_builtin(ctx, prefix::RUN, &args),
        Command::Custom { name, args } => stage::custom(ctx, &name, &args),

        Command::Clean { dry_run, verbose } => clean::clean(ctx, dry_run, verbose),
        Command::Release { remote, no_github } => {
            release::release(ctx, remote.as_deref(), no_github)
        }

        // Configuration
        Command::Config { format, section } => {
            config_cmd::show(ctx, format, section.as_deref())
        }
        Command::ConfigDeploy {
            targets,
            force,
            permissions,
            no_permissions,
            dir_mode,
            file_mode,
        } => {
            let options = DeployOptions {
                force,
                set_permissions: permission_flag(permissions, no_permissions),
                dir_mode,
                file_mode,
            };
            config_cmd::deploy(ctx, &targets, &options)
        }
        Command::ConfigGenerateExamples { destination, force } => {
            config_cmd::generate_examples(ctx, &destination, force)
        }

        // Setup
        Command::Install => install::install(ctx),
        Command::Info => info::info(ctx),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// `--permissions` / `--no-permissions`; neither defers to configuration.
fn permission_flag(permissions: bool, no_permissions: bool) -> Option<bool> {
    match (permissions, no_permissions) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
