//! core::config::examples
//!
//! Writes one example file per configuration layer into a directory, so
//! users can see every option with its default before deploying anything.
//!
//! | File | Layer |
//! |------|-------|
//! | `config.toml` | app and user |
//! | `hosts/example-host.toml` | host |
//! | `.bmk.toml` | project |
//! | `bmk.env.example` | env (`BMK___SECTION__KEY`) |

use std::path::{Path, PathBuf};

use super::overrides::ENV_PREFIX;
use super::paths::{CONFIG_FILE, PROJECT_CONFIG_FILE};
use super::{write_atomic, ConfigError, DEFAULT_CONFIG};

const HOST_EXAMPLE: &str = r#"# bmk host configuration
#
# Copy to <config dir>/hosts/<hostname>.toml. Applies only on that machine,
# above the app layer and below the user layer.

[logging]
level = "info"

[bmk]
# Bundled stage scripts installed system-wide on this host.
# scripts_dir = "/opt/bmk/makescripts"
"#;

const PROJECT_EXAMPLE: &str = r#"# bmk project configuration
#
# Place next to pyproject.toml. Overrides app, host and user layers for this
# project only.

[bmk]
override_dir = "makescripts"
# package_name = "my_package"
show_warnings = true
"#;

/// An example file and its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleFile {
    pub relative_path: PathBuf,
    pub contents: String,
}

/// Every example file, in write order.
pub fn example_files() -> Result<Vec<ExampleFile>, ConfigError> {
    Ok(vec![
        ExampleFile {
            relative_path: PathBuf::from(CONFIG_FILE),
            contents: DEFAULT_CONFIG.to_string(),
        },
        ExampleFile {
            relative_path: Path::new("hosts").join("example-host.toml"),
            contents: HOST_EXAMPLE.to_string(),
        },
        ExampleFile {
            relative_path: PathBuf::from(PROJECT_CONFIG_FILE),
            contents: PROJECT_EXAMPLE.to_string(),
        },
        ExampleFile {
            relative_path: PathBuf::from("bmk.env.example"),
            contents: env_example()?,
        },
    ])
}

/// Environment variable form of every default setting.
pub fn env_example() -> Result<String, ConfigError> {
    let defaults: toml::Table =
        toml::from_str(DEFAULT_CONFIG).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("defaultconfig.toml"),
            message: e.to_string(),
        })?;

    let mut lines = vec![
        "# bmk environment overrides".to_string(),
        "#".to_string(),
        format!(
            "# {}SECTION__KEY=VALUE, nested keys joined by '__'. Values are parsed",
            ENV_PREFIX
        ),
        "# as JSON first and taken as plain strings otherwise.".to_string(),
        String::new(),
    ];
    flatten(&defaults, &mut Vec::new(), &mut lines);
    lines.push(String::new());
    Ok(lines.join("\n"))
}

fn flatten<'a>(table: &'a toml::Table, prefix: &mut Vec<&'a str>, out: &mut Vec<String>) {
    for (key, value) in table {
        prefix.push(key);
        match value {
            toml::Value::Table(inner) => flatten(inner, prefix, out),
            leaf => {
                let name = prefix
                    .iter()
                    .map(|part| part.to_ascii_uppercase())
                    .collect::<Vec<_>>()
                    .join("__");
                out.push(format!("{}{}={}", ENV_PREFIX, name, env_value(leaf)));
            }
        }
        prefix.pop();
    }
}

// Strings are JSON-quoted so values like "755" stay strings.
fn env_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) if s.is_empty() => String::new(),
        toml::Value::String(s) => serde_json::to_string(s).unwrap_or_else(|_| s.clone()),
        other => other.to_string(),
    }
}

/// Write the example files under `destination`.
///
/// Returns the paths written; existing files are skipped unless `force`.
pub fn generate_examples(destination: &Path, force: bool) -> Result<Vec<PathBuf>, ConfigError> {
    let mut written = Vec::new();
    for example in example_files()? {
        let path = destination.join(&example.relative_path);
        if path.exists() && !force {
            tracing::info!(path = %path.display(), "example exists, skipping");
            continue;
        }
        write_atomic(&path, &example.contents)?;
        written.push(path);
    }
    tracing::info!(count = written.len(), destination = %destination.display(), "generated examples");
    Ok(written)
}
