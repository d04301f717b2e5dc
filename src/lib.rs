//! bmk - staged build, test, and release automation for Python projects
//!
//! bmk discovers and runs staged shell/PowerShell scripts, keeps project
//! metadata (`pyproject.toml`, `__init__conf__.py`, `CHANGELOG.md`) in
//! step, and manages layered configuration.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to core)
//! - [`core`] - Manifest, version, changelog, clean, release, and config logic
//! - [`stages`] - Stage script discovery and execution
//! - [`git`] - Single interface for `git` and `gh` subprocesses
//! - [`logging`] - Diagnostic log setup
//! - [`ui`] - User-facing output
//!
//! Only [`git`] and [`stages`] start external processes.

pub mod cli;
pub mod core;
pub mod git;
pub mod logging;
pub mod stages;
pub mod ui;
