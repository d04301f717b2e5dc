//! core
//!
//! Project metadata, release, and configuration logic for bmk.
//!
//! # Modules
//!
//! - [`manifest`] - Typed view of `pyproject.toml`
//! - [`package_name`] - Package name derivation
//! - [`initconf`] - `__init__conf__.py` version sync
//! - [`version`] - Version parsing, bumping, and manifest rewrite
//! - [`changelog`] - Release headers in `CHANGELOG.md`
//! - [`clean`] - Artifact removal
//! - [`release`] - Tag-and-push release flow
//! - [`install`] - Managed Makefile and prerequisites
//! - [`config`] - Layered configuration
//!
//! # Design Principles
//!
//! - Files are rewritten only where they change; everything else is kept
//!   byte-for-byte
//! - Pure text transforms are separate from the I/O that applies them

pub mod changelog;
pub mod clean;
pub mod config;
pub mod initconf;
pub mod install;
pub mod manifest;
pub mod package_name;
pub mod release;
pub mod version;
