//! package-name command - Print the derived package name

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::context::Context;
use crate::core::manifest::Manifest;
use crate::core::package_name::derive_package_name;

/// Print the package name derived from the project manifest.
pub fn package_name(ctx: &Context, project_dir: Option<&Path>) -> Result<()> {
    let dir = match project_dir {
        Some(dir) => ctx.resolve(dir),
        None => ctx.project_dir.clone(),
    };
    let manifest = Manifest::load(&dir)?;
    let name = derive_package_name(&manifest)
        .with_context(|| format!("Failed to derive package name for '{}'", dir.display()))?;

    println!("{}", name);
    Ok(())
}
