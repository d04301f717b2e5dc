//! Integration tests for command handlers.
//!
//! Each test builds a throwaway Python project and calls the handlers the
//! binary dispatches to, with configuration isolated from the host.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use bmk::cli::commands;
use bmk::cli::exit_codes::exit_code_for;
use bmk::cli::Context;
use bmk::core::config::deploy::{DeployOptions, DeployTarget};
use bmk::core::config::display::OutputFormat;
use bmk::core::config::{Config, ConfigPaths, ConfigSources};
use bmk::core::version::BumpPart;
use bmk::stages::StageError;

// =============================================================================
// Test Fixtures
// =============================================================================

const PYPROJECT: &str = r#"[project]
name = "my-tool"
version = "1.4.2"
description = "demo"

[project.scripts]
my-tool = "my_tool.cli:main"

[tool.hatch.build.targets.wheel]
packages = ["src/my_tool"]
"#;

const INITCONF: &str = r#"name = "my_tool"
title = "demo"
version = "0.0.0"
homepage = "https://example.invalid"
"#;

/// A temporary project plus isolated config directories.
struct TestProject {
    root: TempDir,
    config_home: TempDir,
}

impl TestProject {
    fn new() -> Self {
        let root = TempDir::new().expect("failed to create temp dir");
        fs::write(root.path().join("pyproject.toml"), PYPROJECT).unwrap();
        let pkg = root.path().join("src").join("my_tool");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("__init__conf__.py"), INITCONF).unwrap();
        Self {
            root,
            config_home: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn initconf(&self) -> String {
        fs::read_to_string(self.path().join("src/my_tool/__init__conf__.py")).unwrap()
    }

    fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    fn sources(&self, overrides: &[&str]) -> ConfigSources {
        ConfigSources {
            paths: ConfigPaths::from_dirs(
                &self.config_home.path().join("sys"),
                Some(&self.config_home.path().join("user")),
                "test-host",
                None,
            )
            .unwrap(),
            project_dir: Some(self.path().to_path_buf()),
            env: Vec::new(),
            overrides: overrides.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Context with the project layer and `overrides` applied.
    fn ctx_with(&self, overrides: &[&str]) -> Context {
        let mut all: Vec<String> = overrides.iter().map(|s| s.to_string()).collect();
        // Keep a host BMK_SCRIPTS_DIR from leaking into stage discovery.
        if !overrides.iter().any(|o| o.starts_with("bmk.scripts_dir=")) {
            let empty = self.config_home.path().join("no-bundled-scripts");
            all.push(format!("bmk.scripts_dir={}", empty.display()));
        }
        let refs: Vec<&str> = all.iter().map(String::as_str).collect();
        let config = Config::load_from(&self.sources(&refs)).unwrap().config;
        let mut ctx = Context::new(self.path(), config);
        ctx.quiet = true;
        ctx
    }

    fn ctx(&self) -> Context {
        self.ctx_with(&[])
    }
}

// =============================================================================
// sync-initconf / package-name
// =============================================================================

#[test]
fn sync_initconf_rewrites_only_the_version_line() {
    let project = TestProject::new();

    commands::sync_initconf(&project.ctx(), None).unwrap();

    assert_eq!(
        project.initconf(),
        INITCONF.replace("version = \"0.0.0\"", "version = \"1.4.2\"")
    );
}

#[test]
fn sync_initconf_twice_is_a_no_op() {
    let project = TestProject::new();
    let ctx = project.ctx();

    commands::sync_initconf(&ctx, None).unwrap();
    let first = project.initconf();
    commands::sync_initconf(&ctx, None).unwrap();

    assert_eq!(project.initconf(), first);
}

#[test]
fn sync_initconf_with_explicit_project_dir() {
    let project = TestProject::new();
    let other = TestProject::new();

    commands::sync_initconf(&project.ctx(), Some(other.path())).unwrap();

    assert!(other.initconf().contains("version = \"1.4.2\""));
    assert!(project.initconf().contains("version = \"0.0.0\""));
}

#[test]
fn sync_initconf_without_metadata_file_creates_nothing() {
    let project = TestProject::new();
    fs::remove_dir_all(project.path().join("src")).unwrap();

    commands::sync_initconf(&project.ctx(), None).unwrap();

    assert!(!project.path().join("src").exists());
}

#[test]
fn sync_initconf_fails_on_malformed_manifest() {
    let project = TestProject::new();
    project.write("pyproject.toml", "[project\nname = ");

    let err = commands::sync_initconf(&project.ctx(), None).unwrap_err();

    assert_eq!(exit_code_for(&err), 1);
    assert!(project.initconf().contains("version = \"0.0.0\""));
}

#[test]
fn package_name_fails_without_any_candidate() {
    let project = TestProject::new();
    project.write("pyproject.toml", "[project]\nversion = \"1.0.0\"\n");

    let err = commands::package_name(&project.ctx(), None).unwrap_err();
    assert_eq!(exit_code_for(&err), 1);
}

// =============================================================================
// bump
// =============================================================================

#[test]
fn bump_updates_manifest_changelog_and_initconf() {
    let project = TestProject::new();
    project.write(
        "CHANGELOG.md",
        "# Changelog\n\n## [Unreleased]\n- new thing\n\n## [1.4.2] 2024-01-01 00:00:00\n",
    );

    commands::bump(&project.ctx(), BumpPart::Minor).unwrap();

    let manifest = fs::read_to_string(project.path().join("pyproject.toml")).unwrap();
    assert!(manifest.contains("version = \"1.5.0\""));
    assert!(manifest.contains("description = \"demo\""));

    let changelog = fs::read_to_string(project.path().join("CHANGELOG.md")).unwrap();
    assert!(changelog.contains("## [Unreleased]\n\n## [1.5.0] "));
    assert!(changelog.contains("## [1.4.2] 2024-01-01 00:00:00"));

    assert!(project.initconf().contains("version = \"1.5.0\""));
}

#[test]
fn bump_without_version_fails() {
    let project = TestProject::new();
    project.write("pyproject.toml", "[project]\nname = \"my-tool\"\n");

    assert!(commands::bump(&project.ctx(), BumpPart::Patch).is_err());
}

#[test]
fn bump_without_derivable_package_bumps_once() {
    let project = TestProject::new();
    project.write("pyproject.toml", "[project]\nversion = \"1.0.0\"\n");

    commands::bump(&project.ctx(), BumpPart::Patch).unwrap();

    let manifest = fs::read_to_string(project.path().join("pyproject.toml")).unwrap();
    assert_eq!(manifest, "[project]\nversion = \"1.0.1\"\n");
    assert!(project.initconf().contains("version = \"0.0.0\""));
}

#[test]
fn bump_overflow_leaves_manifest_untouched() {
    let project = TestProject::new();
    let original = format!("[project]\nname = \"my-tool\"\nversion = \"{}.0.0\"\n", u64::MAX);
    project.write("pyproject.toml", &original);

    let err = commands::bump(&project.ctx(), BumpPart::Major).unwrap_err();

    assert!(err.to_string().contains("overflow"));
    assert_eq!(exit_code_for(&err), 1);
    let manifest = fs::read_to_string(project.path().join("pyproject.toml")).unwrap();
    assert_eq!(manifest, original);
}

// =============================================================================
// stages
// =============================================================================

#[test]
fn missing_stage_scripts_exit_2() {
    let project = TestProject::new();

    let err = commands::run_builtin(&project.ctx(), commands::prefix::TEST, &[]).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StageError>(),
        Some(StageError::NoScripts { .. })
    ));
    assert_eq!(exit_code_for(&err), 2);
}

#[test]
fn custom_rejects_invalid_names() {
    let project = TestProject::new();

    let err = commands::custom(&project.ctx(), "../escape", &[]).unwrap_err();
    assert_eq!(exit_code_for(&err), 22);
}

#[test]
fn custom_without_override_dir_exit_2() {
    let project = TestProject::new();

    let err = commands::custom(&project.ctx(), "docs", &[]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StageError>(),
        Some(StageError::OverrideDirMissing(_))
    ));
    assert_eq!(exit_code_for(&err), 2);
}

#[cfg(unix)]
mod unix_stages {
    use super::*;

    const RECORD: &str =
        "echo \"$BMK_COMMAND_PREFIX $BMK_PACKAGE_NAME $BMK_STAGE_INDEX/$BMK_STAGE_TOTAL $*\" >> \"$BMK_PROJECT_DIR/out.txt\"\n";

    fn out(project: &TestProject) -> String {
        fs::read_to_string(project.path().join("out.txt")).unwrap_or_default()
    }

    #[test]
    fn builtin_stage_runs_override_and_bundled_scripts_in_order() {
        let project = TestProject::new();
        let bundled = TempDir::new().unwrap();
        fs::write(bundled.path().join("test_010_lint.sh"), RECORD).unwrap();
        fs::write(bundled.path().join("test_020_unit.sh"), "exit 9\n").unwrap();
        project.write("makescripts/test_020_unit.sh", RECORD);
        project.write("makescripts/test_integration_010_slow.sh", "exit 9\n");

        let scripts_dir = format!("bmk.scripts_dir={}", bundled.path().display());
        let ctx = project.ctx_with(&[&scripts_dir]);
        commands::run_builtin(&ctx, commands::prefix::TEST, &["-k".to_string(), "x".to_string()])
            .unwrap();

        assert_eq!(out(&project), "test my_tool 1/2 -k x\ntest my_tool 2/2 -k x\n");
    }

    #[test]
    fn configured_package_name_is_exported() {
        let project = TestProject::new();
        project.write("makescripts/run_010_app.sh", RECORD);

        let ctx = project.ctx_with(&["bmk.package_name=custom_pkg"]);
        commands::run_builtin(&ctx, commands::prefix::RUN, &[]).unwrap();

        assert_eq!(out(&project), "run custom_pkg 1/1 \n");
    }

    #[test]
    fn test_stages_export_output_format() {
        let project = TestProject::new();
        project.write(
            "makescripts/test_integration_010_fmt.sh",
            "echo \"$BMK_COMMAND_PREFIX $BMK_OUTPUT_FORMAT\" >> \"$BMK_PROJECT_DIR/out.txt\"\n",
        );

        commands::run_tests(&project.ctx(), commands::prefix::TEST_INTEGRATION, true, &[])
            .unwrap();

        assert_eq!(out(&project), "test_integration text\n");
    }

    #[test]
    fn deps_update_uses_its_own_prefix() {
        let project = TestProject::new();
        project.write("makescripts/deps_010_audit.sh", RECORD);
        project.write("makescripts/deps_update_010_pin.sh", RECORD);

        commands::run_builtin(&project.ctx(), commands::prefix::DEPS_UPDATE, &[]).unwrap();

        assert_eq!(out(&project), "deps_update my_tool 1/1 \n");
    }

    #[test]
    fn project_config_moves_the_override_dir() {
        let project = TestProject::new();
        project.write(".bmk.toml", "[bmk]\noverride_dir = \"ci/scripts\"\n");
        project.write("ci/scripts/docs_010_build.sh", RECORD);

        commands::custom(&project.ctx(), "docs", &["html".to_string()]).unwrap();

        assert_eq!(out(&project), "docs my_tool 1/1 html\n");
    }

    #[test]
    fn failing_script_code_becomes_exit_code() {
        let project = TestProject::new();
        project.write("makescripts/bld_010_ok.sh", RECORD);
        project.write("makescripts/bld_020_fail.sh", "exit 4\n");
        project.write("makescripts/bld_030_never.sh", RECORD);

        let err = commands::run_builtin(&project.ctx(), commands::prefix::BUILD, &[]).unwrap_err();

        assert_eq!(exit_code_for(&err), 4);
        assert_eq!(out(&project), "bld my_tool 1/3 \n");
    }
}

// =============================================================================
// clean
// =============================================================================

#[test]
fn clean_dry_run_keeps_files() {
    let project = TestProject::new();
    project.write("dist/pkg.whl", "");
    project.write(".pytest_cache/x", "");

    commands::clean(&project.ctx(), true, false).unwrap();

    assert!(project.path().join("dist/pkg.whl").exists());
    assert!(project.path().join(".pytest_cache").exists());
}

#[test]
fn clean_uses_manifest_patterns() {
    let project = TestProject::new();
    project.write(
        "pyproject.toml",
        &format!("{}\n[tool.clean]\npatterns = [\"out\", \"*.log\"]\n", PYPROJECT),
    );
    project.write("out/a.txt", "");
    project.write("run.log", "");
    project.write("dist/keep.whl", "");

    commands::clean(&project.ctx(), false, true).unwrap();

    assert!(!project.path().join("out").exists());
    assert!(!project.path().join("run.log").exists());
    assert!(project.path().join("dist/keep.whl").exists());
    assert!(project.path().join("pyproject.toml").exists());
}

// =============================================================================
// config / install
// =============================================================================

#[test]
fn config_unknown_section_exit_22() {
    let project = TestProject::new();

    let err = commands::config_show(&project.ctx(), OutputFormat::Human, Some("nope")).unwrap_err();
    assert_eq!(exit_code_for(&err), 22);
}

#[test]
fn config_deploy_writes_user_file_once() {
    let project = TestProject::new();
    let ctx = project.ctx();
    let user = ctx.config.paths().user.clone().unwrap();

    commands::config_deploy(&ctx, &[DeployTarget::User], &DeployOptions::default()).unwrap();
    assert!(user.exists());

    fs::write(&user, "# edited\n").unwrap();
    commands::config_deploy(&ctx, &[DeployTarget::User], &DeployOptions::default()).unwrap();
    assert_eq!(fs::read_to_string(&user).unwrap(), "# edited\n");
}

#[test]
fn config_generate_examples_resolves_against_project() {
    let project = TestProject::new();
    let ctx = project.ctx();

    commands::config_generate_examples(&ctx, Path::new("conf-examples"), false).unwrap();

    let dir = project.path().join("conf-examples");
    for file in ["config.toml", "hosts/example-host.toml", ".bmk.toml", "bmk.env.example"] {
        assert!(dir.join(file).exists(), "missing {}", file);
    }

    fs::write(dir.join(".bmk.toml"), "# mine\n").unwrap();
    commands::config_generate_examples(&ctx, Path::new("conf-examples"), false).unwrap();
    assert_eq!(fs::read_to_string(dir.join(".bmk.toml")).unwrap(), "# mine\n");
}

#[test]
fn install_refuses_unmanaged_makefile() {
    let project = TestProject::new();
    project.write("Makefile", "all:\n\ttrue\n");

    let err = commands::install(&project.ctx()).unwrap_err();

    assert_eq!(exit_code_for(&err), 1);
    assert_eq!(
        fs::read_to_string(project.path().join("Makefile")).unwrap(),
        "all:\n\ttrue\n"
    );
}

#[test]
fn install_then_update() {
    let project = TestProject::new();

    commands::install(&project.ctx()).unwrap();
    commands::install(&project.ctx()).unwrap();

    let makefile = fs::read_to_string(project.path().join("Makefile")).unwrap();
    assert!(makefile.starts_with("# BMK MAKEFILE "));
}

#[test]
fn completion_mentions_subcommands() {
    let mut buf = Vec::new();
    commands::write_completion(bmk::cli::Shell::Bash, &mut buf);
    let script = String::from_utf8(buf).unwrap();

    assert!(script.contains("sync-initconf"));
    assert!(script.contains("config-deploy"));
}
