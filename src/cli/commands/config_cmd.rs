//! config commands - Show, deploy and generate examples of layered configuration

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::context::Context;
use crate::core::config::deploy::{deploy as deploy_config, DeployOptions, DeployTarget};
use crate::core::config::display::{render, OutputFormat};
use crate::core::config::examples::generate_examples as write_examples;
use crate::ui::output;

/// Print the merged configuration.
pub fn show(ctx: &Context, format: OutputFormat, section: Option<&str>) -> Result<()> {
    let rendered = render(&ctx.config, format, section)?;
    print!("{}", rendered);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

/// Write the default configuration to the chosen layers.
pub fn deploy(ctx: &Context, targets: &[DeployTarget], options: &DeployOptions) -> Result<()> {
    let verbosity = ctx.verbosity();
    let results = deploy_config(
        ctx.config.paths(),
        targets,
        &ctx.config.settings().deploy.permissions,
        options,
    )
    .context("Failed to deploy configuration")?;

    let deployed: Vec<_> = results
        .iter()
        .filter(|r| r.deployed())
        .map(|r| r.path.display().to_string())
        .collect();
    for skipped in results.iter().filter(|r| !r.deployed()) {
        output::warn(
            format!("{} exists, use --force to overwrite", skipped.path.display()),
            verbosity,
        );
    }

    if deployed.is_empty() {
        output::print("No configuration deployed", verbosity);
    } else {
        output::print("Deployed configuration to:", verbosity);
        output::print(output::format_list(&deployed, "  "), verbosity);
    }
    Ok(())
}

/// Write one example file per configuration layer into `destination`.
pub fn generate_examples(ctx: &Context, destination: &Path, force: bool) -> Result<()> {
    let verbosity = ctx.verbosity();
    let destination = ctx.resolve(destination);
    let written = write_examples(&destination, force).with_context(|| {
        format!("Failed to generate examples in '{}'", destination.display())
    })?;

    if written.is_empty() {
        output::print(
            "No example files generated (all exist), use --force to overwrite",
            verbosity,
        );
    } else {
        let paths: Vec<_> = written.iter().map(|p| p.display().to_string()).collect();
        output::print(
            format!("Generated {} example file(s):", written.len()),
            verbosity,
        );
        output::print(output::format_list(&paths, "  "), verbosity);
    }
    Ok(())
}
