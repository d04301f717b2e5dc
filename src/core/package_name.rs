//! core::package_name
//!
//! Derivation of the importable package name from the manifest.
//!
//! # Resolution Order
//!
//! The first rule that yields a non-empty name wins:
//!
//! 1. First entry of `tool.hatch.build.targets.wheel.packages`, final path
//!    segment only (`src/foo` -> `foo`)
//! 2. First `project.scripts` value (file order) containing `:`; the module
//!    path before `:` truncated at the first `.` (`pkg.sub:main` -> `pkg`).
//!    Later scripts are not consulted when that value yields nothing.
//! 3. `project.name` with `-` replaced by `_`
//!
//! The stage runner and the metadata sync both depend on this order. The
//! result is not validated as a Python identifier.
//!
//! # Example
//!
//! ```
//! use bmk::core::manifest::Manifest;
//! use bmk::core::package_name::derive_package_name;
//!
//! let manifest = Manifest::parse("[project]\nname = \"my-tool\"\n").unwrap();
//! assert_eq!(derive_package_name(&manifest).unwrap(), "my_tool");
//! ```

use std::path::Path;

use thiserror::Error;

use super::manifest::Manifest;

/// Errors from package name derivation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackageNameError {
    #[error(
        "cannot derive package name: no wheel packages, no 'module:callable' scripts, and no project name"
    )]
    NoCandidate,
}

/// Derive the importable package name.
pub fn derive_package_name(manifest: &Manifest) -> Result<String, PackageNameError> {
    if let Some(name) = from_wheel_packages(manifest.wheel_packages()) {
        return Ok(name);
    }

    if let Some(name) = from_scripts(manifest.script_entries().map(|(_, spec)| spec)) {
        return Ok(name);
    }

    manifest
        .name()
        .map(|name| name.replace('-', "_"))
        .ok_or(PackageNameError::NoCandidate)
}

fn from_wheel_packages(packages: &[String]) -> Option<String> {
    let first = packages.first()?;
    Path::new(first)
        .file_name()
        .map(|segment| segment.to_string_lossy().into_owned())
        .filter(|segment| !segment.is_empty())
}

/// Only the first `module:callable` value is considered; an empty module
/// there falls through to the project name.
fn from_scripts<'a>(mut specs: impl Iterator<Item = &'a str>) -> Option<String> {
    let module = specs.find_map(|spec| spec.split_once(':').map(|(module, _)| module))?;
    let top = module.split('.').next().unwrap_or(module);
    (!top.is_empty()).then(|| top.to_string())
}
