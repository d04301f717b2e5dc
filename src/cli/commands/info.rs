//! info command - Show program and project information

use anyhow::Result;

use crate::cli::context::Context;
use crate::core::config::paths::PROJECT_CONFIG_FILE;
use crate::core::manifest::Manifest;
use crate::core::package_name::derive_package_name;

/// Print name, version, config locations, and project details.
pub fn info(ctx: &Context) -> Result<()> {
    let paths = ctx.config.paths();

    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();

    println!("Configuration:");
    if let Some(profile) = &paths.profile {
        println!("  profile: {}", profile);
    }
    println!("  app:     {}", paths.app.display());
    println!("  host:    {}", paths.host.display());
    match &paths.user {
        Some(user) => println!("  user:    {}", user.display()),
        None => println!("  user:    (no user config directory)"),
    }
    println!(
        "  project: {}",
        ctx.project_dir.join(PROJECT_CONFIG_FILE).display()
    );
    for (layer, path) in ctx.config.loaded_files() {
        println!("  loaded ({}): {}", layer, path.display());
    }
    println!();

    println!("Project:");
    println!("  directory: {}", ctx.project_dir.display());
    let manifest_path = Manifest::path_in(&ctx.project_dir);
    if manifest_path.exists() {
        match Manifest::load(&ctx.project_dir) {
            Ok(manifest) => {
                if let Some(version) = manifest.version() {
                    println!("  version:   {}", version);
                }
                match derive_package_name(&manifest) {
                    Ok(name) => println!("  package:   {}", name),
                    Err(e) => println!("  package:   ({})", e),
                }
            }
            Err(e) => println!("  manifest:  {}", e),
        }
    } else {
        println!("  manifest:  (no pyproject.toml)");
    }

    Ok(())
}
