//! core::config::display
//!
//! Rendering of the merged configuration for `bmk config`.
//!
//! Human output is TOML-like, one `key = value` per line with the
//! originating layer as a trailing comment. JSON output is the plain merged
//! document.

use std::fmt::Write as _;

use clap::ValueEnum;

use super::{Config, ConfigError};

/// Output format of `bmk config`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Render the whole configuration, or one top-level section.
///
/// # Errors
///
/// Returns `ConfigError::UnknownSection` when `section` does not exist.
pub fn render(
    config: &Config,
    format: OutputFormat,
    section: Option<&str>,
) -> Result<String, ConfigError> {
    let (table, prefix) = match section {
        Some(name) => (config.section(name)?, name.to_string()),
        None => (config.as_table(), String::new()),
    };

    match format {
        OutputFormat::Json => serde_json::to_string_pretty(table)
            .map_err(|e| ConfigError::InvalidValue(e.to_string())),
        OutputFormat::Human => {
            let mut out = String::new();
            if let Some(profile) = &config.paths().profile {
                let _ = writeln!(out, "# profile: {}", profile);
            }
            render_table(config, table, &prefix, &mut out);
            Ok(out)
        }
    }
}

fn render_table(config: &Config, table: &toml::Table, prefix: &str, out: &mut String) {
    let (leaves, tables): (Vec<_>, Vec<_>) = table.iter().partition(|(_, v)| !v.is_table());

    if !leaves.is_empty() {
        if !prefix.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "[{}]", prefix);
        }
        for (key, value) in leaves {
            let dotted = join(prefix, key);
            let _ = write!(out, "{} = {}", key, value);
            if let Some(p) = config.provenance(&dotted) {
                match &p.source {
                    Some(source) => {
                        let _ = write!(out, "  # {}: {}", p.layer, source);
                    }
                    None => {
                        let _ = write!(out, "  # {}", p.layer);
                    }
                }
            }
            out.push('\n');
        }
    }

    for (key, value) in tables {
        if let Some(sub) = value.as_table() {
            render_table(config, sub, &join(prefix, key), out);
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ConfigPaths, ConfigSources};
    use tempfile::TempDir;

    fn load(overrides: &[&str]) -> (TempDir, Config) {
        let temp = TempDir::new().unwrap();
        let sources = ConfigSources {
            paths: ConfigPaths::from_dirs(&temp.path().join("sys"), None, "h", None).unwrap(),
            project_dir: None,
            env: Vec::new(),
            overrides: overrides.iter().map(|s| s.to_string()).collect(),
        };
        let config = Config::load_from(&sources).unwrap().config;
        (temp, config)
    }

    #[test]
    fn human_shows_sections_and_provenance() {
        let (_t, config) = load(&["logging.level=info"]);
        let out = render(&config, OutputFormat::Human, None).unwrap();

        assert!(out.contains("[bmk]\n"));
        assert!(out.contains("override_dir = \"makescripts\"  # defaults\n"));
        assert!(out.contains("level = \"info\"  # cli: --set logging.level\n"));
        assert!(out.contains("[deploy.permissions]\n"));
    }

    #[test]
    fn single_section() {
        let (_t, config) = load(&[]);
        let out = render(&config, OutputFormat::Human, Some("logging")).unwrap();
        assert_eq!(out, "[logging]\nlevel = \"warn\"  # defaults\n");
    }

    #[test]
    fn json_section() {
        let (_t, config) = load(&[]);
        let out = render(&config, OutputFormat::Json, Some("bmk")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["override_dir"], "makescripts");
        assert_eq!(parsed["show_warnings"], true);
    }

    #[test]
    fn unknown_section() {
        let (_t, config) = load(&[]);
        assert!(matches!(
            render(&config, OutputFormat::Json, Some("missing")),
            Err(ConfigError::UnknownSection(_))
        ));
    }
}
