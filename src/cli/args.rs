//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Project directory (defaults to the current directory)
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Errors only
//! - `--profile <name>`: Configuration profile
//! - `--set <SECTION.KEY=VALUE>`: Configuration override (repeatable)

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::deploy::DeployTarget;
use crate::core::config::display::OutputFormat;
use crate::core::version::BumpPart;

/// bmk - staged build, test, and release automation for Python projects
#[derive(Parser, Debug)]
#[command(name = "bmk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if bmk was started in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration profile (selects profile/<NAME>/ below each config directory)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Override a configuration value (repeatable)
    #[arg(long = "set", global = true, value_name = "SECTION.KEY=VALUE")]
    pub overrides: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    // ========== Project metadata ==========
    /// Copy the pyproject.toml version into __init__conf__.py
    #[command(
        name = "sync-initconf",
        long_about = "Copy the project version into the package metadata file.\n\n\
            Reads [project].version from pyproject.toml, derives the package name, and \
            rewrites the version line of src/<package>/__init__conf__.py. Nothing else \
            in the file changes. A missing metadata file or an already matching version \
            is not an error; running the command twice has no further effect.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Sync the project in the current directory
    bmk sync-initconf

    # Sync another checkout
    bmk sync-initconf --project-dir ../other-project

HOW THE PACKAGE NAME IS FOUND:
    1. first entry of [tool.hatch.build.targets.wheel].packages (src/foo -> foo)
    2. first [project.scripts] target (foo.cli:main -> foo)
    3. [project].name with '-' replaced by '_'"
    )]
    SyncInitconf {
        /// Project root containing pyproject.toml
        #[arg(long, value_name = "DIR")]
        project_dir: Option<PathBuf>,
    },

    /// Print the derived package name
    #[command(
        name = "package-name",
        long_about = "Print the importable package name derived from pyproject.toml.\n\n\
            Uses the same rules as sync-initconf. Exits with status 1 when no name \
            can be derived.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Use the package name in a shell script
    pkg=$(bmk package-name)
    python -m \"$pkg\" --help"
    )]
    PackageName {
        /// Project root containing pyproject.toml
        #[arg(long, value_name = "DIR")]
        project_dir: Option<PathBuf>,
    },

    /// Bump the project version
    #[command(
        name = "bump",
        visible_aliases = ["bmp", "b"],
        long_about = "Bump the major, minor, or patch version.\n\n\
            Rewrites the version line in pyproject.toml, records the new version in \
            CHANGELOG.md (below ## [Unreleased]) when that file exists, and syncs \
            __init__conf__.py. Other formatting in each file is preserved.",
        after_help = "\
WORKFLOW EXAMPLES:
    # 1.4.2 -> 1.4.3
    bmk bump patch

    # 1.4.2 -> 1.5.0
    bmk bump m

    # 1.4.2 -> 2.0.0
    bmk bump major

    # Typical release
    bmk bump minor && bmk commit \"release 1.5.0\" && bmk release"
    )]
    Bump {
        /// Version part to bump
        #[arg(value_enum)]
        part: BumpPart,
    },

    // ========== Stages ==========
    /// Run the test stage
    #[command(
        name = "test",
        visible_alias = "t",
        long_about = "Run the test stage.\n\n\
            Executes every test_<NN>_*.sh script (test_<NN>_*.ps1 on Windows) from the \
            override and bundled script directories in file-name order. The first \
            failing script stops the stage and its exit code becomes bmk's exit code.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Run all checks
    bmk test

    # Pass arguments through to every script
    bmk test -- -k parser

    # Plain-text tool output instead of JSON
    bmk test --human

ENVIRONMENT PASSED TO SCRIPTS:
    BMK_PROJECT_DIR, BMK_COMMAND_PREFIX, BMK_SHOW_WARNINGS, BMK_OVERRIDE_DIR,
    BMK_PACKAGE_NAME, BMK_STAGE_INDEX, BMK_STAGE_TOTAL, BMK_OUTPUT_FORMAT"
    )]
    Test {
        /// Ask scripts for human-readable text output instead of JSON
        #[arg(long)]
        human: bool,

        /// Arguments passed to each script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the integration test stage
    #[command(
        name = "testintegration",
        visible_aliases = ["testi", "ti"],
        long_about = "Run the integration test stage (test_integration_<NN>_* scripts).\n\n\
            Scripts get BMK_OUTPUT_FORMAT=json unless --human is given or the \
            variable is already set."
    )]
    TestIntegration {
        /// Ask scripts for human-readable text output instead of JSON
        #[arg(long)]
        human: bool,

        /// Arguments passed to each script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the build stage
    #[command(
        name = "build",
        visible_alias = "bld",
        long_about = "Build the project by running the bld_<NN>_* scripts."
    )]
    Build,

    /// Commit all changes
    #[command(
        name = "commit",
        visible_alias = "c",
        long_about = "Run the commit stage.\n\n\
            The message words are passed to the commit_<NN>_* scripts as arguments.",
        after_help = "\
WORKFLOW EXAMPLES:
    bmk commit fix parser edge case
    bmk c \"docs: update readme\""
    )]
    Commit {
        /// Commit message
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },

    /// Commit and push
    #[command(
        name = "push",
        visible_aliases = ["psh", "p"],
        long_about = "Run the push stage.\n\n\
            The message words are passed to the push_<NN>_* scripts as arguments."
    )]
    Push {
        /// Commit message
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },

    /// Check or update dependencies
    #[command(
        name = "dependencies",
        visible_aliases = ["deps", "d"],
        long_about = "Run the dependency stage.\n\n\
            Without flags the deps_<NN>_* scripts run; with --update the \
            deps_update_<NN>_* scripts run instead.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Report outdated or vulnerable dependencies
    bmk deps

    # Update dependency pins
    bmk deps --update"
    )]
    Dependencies {
        /// Run the update scripts
        #[arg(short, long)]
        update: bool,
    },

    /// Run the coverage stage
    #[command(
        name = "coverage",
        visible_aliases = ["cov", "codecov"],
        long_about = "Run the coverage stage (cov_<NN>_* scripts)."
    )]
    Coverage,

    /// Run the project
    #[command(
        name = "run",
        long_about = "Run the run_<NN>_* scripts with the given arguments.",
        after_help = "\
WORKFLOW EXAMPLES:
    bmk run --help
    bmk run serve --port 8080"
    )]
    Run {
        /// Arguments passed to each script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a user-defined stage from the override directory
    #[command(
        name = "custom",
        long_about = "Run a user-defined stage.\n\n\
            Looks for <NAME>_<NN>_*.sh (or .ps1 on Windows) in the override directory \
            only. NAME may contain letters, digits, '-' and '_' and must start with a \
            letter or digit.",
        after_help = "\
WORKFLOW EXAMPLES:
    # makescripts/docs_010_build.sh, makescripts/docs_020_publish.sh
    bmk custom docs

    # Pass arguments
    bmk custom deploy staging --dry-run"
    )]
    Custom {
        /// Stage name (script prefix)
        name: String,

        /// Arguments passed to each script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Remove build artifacts and caches
    #[command(
        name = "clean",
        visible_aliases = ["cln", "cl"],
        long_about = "Remove build artifacts and caches.\n\n\
            Patterns come from [tool.clean].patterns in pyproject.toml; without that \
            table a built-in list (build, dist, *.egg-info, .pytest_cache, ...) is used. \
            Patterns are matched relative to the project directory.",
        after_help = "\
WORKFLOW EXAMPLES:
    # See what would be removed
    bmk clean --dry-run

    # Remove and list every path
    bmk clean --verbose"
    )]
    Clean {
        /// List matches without removing them
        #[arg(long, short = 'n')]
        dry_run: bool,

        /// Print every removed path
        #[arg(long, short)]
        verbose: bool,
    },

    /// Tag and publish the current version
    #[command(
        name = "release",
        visible_aliases = ["rel", "r"],
        long_about = "Create and push the release tag for the current version.\n\n\
            Requires a clean working tree and an X.Y.Z version in pyproject.toml. \
            Pushes the current branch, creates the annotated tag v<version> unless it \
            already exists, pushes it, and creates or updates the GitHub release \
            when the gh CLI is available.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Release to origin (or [tool.git].default-remote)
    bmk release

    # Release to another remote without touching GitHub
    bmk release --remote upstream --no-github"
    )]
    Release {
        /// Remote to push to
        #[arg(long, value_name = "NAME")]
        remote: Option<String>,

        /// Do not create a GitHub release
        #[arg(long)]
        no_github: bool,
    },

    // ========== Configuration ==========
    /// Show the merged configuration
    #[command(
        name = "config",
        long_about = "Show the merged configuration with the layer each value came from.\n\n\
            Layers, lowest precedence first: defaults, app, host, user, project \
            (.bmk.toml), environment (BMK___SECTION__KEY), and --set.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Everything, annotated with provenance
    bmk config

    # One section as JSON
    bmk config --section bmk --format json

    # Try an override without writing a file
    bmk --set logging.level=debug config --section logging"
    )]
    Config {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,

        /// Show only this top-level section
        #[arg(long, value_name = "NAME")]
        section: Option<String>,
    },

    /// Write the default configuration to config locations
    #[command(
        name = "config-deploy",
        long_about = "Write the default configuration file to one or more layer locations.\n\n\
            Existing files are skipped unless --force is given. On Unix, new \
            directories and files get the modes from [deploy.permissions]; \
            --dir-mode and --file-mode override them.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Personal configuration
    bmk config-deploy --target user

    # Machine-wide defaults for a profile (usually needs root)
    sudo bmk config-deploy --target app --target host --profile ci

    # Replace an existing file, group-readable
    bmk config-deploy --target user --force --file-mode 640"
    )]
    ConfigDeploy {
        /// Layer to deploy to (repeatable)
        #[arg(long = "target", value_enum, required = true)]
        targets: Vec<DeployTarget>,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,

        /// Apply Unix permissions
        #[arg(long, overrides_with = "no_permissions")]
        permissions: bool,

        /// Leave permissions to the umask
        #[arg(long, overrides_with = "permissions")]
        no_permissions: bool,

        /// Directory mode (octal, e.g. 750)
        #[arg(long, value_name = "OCTAL", value_parser = parse_mode)]
        dir_mode: Option<u32>,

        /// File mode (octal, e.g. 640)
        #[arg(long, value_name = "OCTAL", value_parser = parse_mode)]
        file_mode: Option<u32>,
    },

    /// Write example configuration files for every layer
    #[command(
        name = "config-generate-examples",
        long_about = "Write one example file per configuration layer into a directory.\n\n\
            The files show every option with its default: config.toml (app and \
            user), hosts/example-host.toml, .bmk.toml (project) and \
            bmk.env.example (environment variables). Existing files are kept \
            unless --force is given.",
        after_help = "\
WORKFLOW EXAMPLES:
    bmk config-generate-examples --destination ./config-examples
    bmk config-generate-examples --destination ./config-examples --force"
    )]
    ConfigGenerateExamples {
        /// Directory to write the example files to
        #[arg(long, value_name = "DIR")]
        destination: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    // ========== Setup ==========
    /// Install the managed Makefile into the project
    #[command(
        name = "install",
        long_about = "Install the bmk Makefile into the project directory.\n\n\
            A Makefile bmk did not write is never replaced. Afterwards the \
            prerequisites used by the stage scripts are checked.",
        after_help = "\
WORKFLOW EXAMPLES:
    bmk install
    make test"
    )]
    Install,

    /// Show program and project information
    #[command(name = "info")]
    Info,

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash
    bmk completion bash > ~/.local/share/bash-completion/completions/bmk

    # Zsh
    bmk completion zsh > \"${fpath[1]}/_bmk\"

    # Fish
    bmk completion fish > ~/.config/fish/completions/bmk.fish

    # PowerShell
    bmk completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_mode(s: &str) -> Result<u32, String> {
    crate::core::config::schema::parse_octal(s).map_err(|e| e.to_string())
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bmk").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["info", "--cwd", "/tmp/p", "--set", "a.b=1", "--set", "c.d=x", "-q"]);
        assert_eq!(cli.cwd, Some(PathBuf::from("/tmp/p")));
        assert_eq!(cli.overrides, vec!["a.b=1", "c.d=x"]);
        assert!(cli.quiet);
    }

    #[test]
    fn bump_aliases() {
        assert!(matches!(
            parse(&["b", "ma"]).command,
            Command::Bump {
                part: BumpPart::Major
            }
        ));
        assert!(matches!(
            parse(&["bmp", "p"]).command,
            Command::Bump {
                part: BumpPart::Patch
            }
        ));
    }

    #[test]
    fn pass_through_args_keep_hyphens() {
        match parse(&["t", "-x", "--fast"]).command {
            Command::Test { human, args } => {
                assert!(!human);
                assert_eq!(args, vec!["-x", "--fast"]);
            }
            other => panic!("unexpected {:?}", other),
        }
        match parse(&["custom", "docs", "--serve"]).command {
            Command::Custom { name, args } => {
                assert_eq!(name, "docs");
                assert_eq!(args, vec!["--serve"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn deploy_requires_target_and_parses_modes() {
        assert!(Cli::try_parse_from(["bmk", "config-deploy"]).is_err());
        match parse(&["config-deploy", "--target", "user", "--target", "app", "--dir-mode", "750"])
            .command
        {
            Command::ConfigDeploy {
                targets, dir_mode, ..
            } => {
                assert_eq!(targets, vec![DeployTarget::User, DeployTarget::App]);
                assert_eq!(dir_mode, Some(0o750));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Cli::try_parse_from(["bmk", "config-deploy", "--target", "user", "--file-mode", "9"]).is_err());
    }

    #[test]
    fn human_flag_on_test_stages() {
        match parse(&["t", "--human", "-k", "parser"]).command {
            Command::Test { human, args } => {
                assert!(human);
                assert_eq!(args, vec!["-k", "parser"]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse(&["ti", "--human"]).command,
            Command::TestIntegration { human: true, .. }
        ));
    }

    #[test]
    fn generate_examples_requires_destination() {
        assert!(Cli::try_parse_from(["bmk", "config-generate-examples"]).is_err());
        match parse(&["config-generate-examples", "--destination", "out", "--force"]).command {
            Command::ConfigGenerateExamples { destination, force } => {
                assert_eq!(destination, PathBuf::from("out"));
                assert!(force);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn deps_update_flag() {
        assert!(matches!(
            parse(&["d", "-u"]).command,
            Command::Dependencies { update: true }
        ));
    }
}
