//! core::config
//!
//! Layered configuration loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Embedded defaults (`defaultconfig.toml`)
//! 2. App file (machine-wide)
//! 3. Host file (machine-wide, per host name)
//! 4. User file
//! 5. Project file (`<project>/.bmk.toml`)
//! 6. Environment (`BMK___SECTION__KEY=value`)
//! 7. CLI overrides (`--set SECTION.KEY=VALUE`)
//!
//! See [`paths`] for where the app, host and user files live.
//!
//! # Merging
//!
//! Tables merge key by key; scalars and arrays replace. Every leaf records
//! the layer and file it came from, which `bmk config` prints next to the
//! value.
//!
//! # Example
//!
//! ```no_run
//! use bmk::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new(".")), None, &["logging.level=debug".into()]).unwrap();
//! let config = result.config;
//!
//! assert_eq!(config.settings().logging.level, "debug");
//! println!("override dir: {:?}", config.settings().bmk.override_dir());
//! ```

pub mod deploy;
pub mod display;
pub mod examples;
pub mod overrides;
pub mod paths;
pub mod schema;

pub use paths::ConfigPaths;
pub use schema::Settings;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use overrides::{parse_env_var, parse_override, ConfigOverride};

/// The embedded default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("defaultconfig.toml");

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("invalid override '{raw}': {reason}")]
    InvalidOverride { raw: String, reason: String },

    #[error("invalid profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    #[error("section '{0}' not found in configuration")]
    UnknownSection(String),

    #[error("no user configuration directory on this platform")]
    NoConfigDir,
}

/// Configuration layer, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Defaults,
    App,
    Host,
    User,
    Project,
    Env,
    Cli,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::Defaults => "defaults",
            Layer::App => "app",
            Layer::Host => "host",
            Layer::User => "user",
            Layer::Project => "project",
            Layer::Env => "env",
            Layer::Cli => "cli",
        };
        f.write_str(name)
    }
}

/// Where a value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub layer: Layer,
    /// File path, or the variable / argument for env and cli values.
    pub source: Option<String>,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The file or variable that triggered the warning.
    pub source: String,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Inputs for [`Config::load_from`].
#[derive(Debug, Clone)]
pub struct ConfigSources {
    pub paths: ConfigPaths,
    pub project_dir: Option<PathBuf>,
    /// Environment variables to scan for `BMK___` entries.
    pub env: Vec<(String, String)>,
    /// Raw `--set` arguments.
    pub overrides: Vec<String>,
}

/// Merged configuration from all layers.
#[derive(Debug, Clone)]
pub struct Config {
    data: toml::Table,
    provenance: BTreeMap<String, Provenance>,
    settings: Settings,
    paths: ConfigPaths,
    loaded: Vec<(Layer, PathBuf)>,
}

impl Config {
    /// Load configuration from the platform locations and process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed, if an
    /// override is malformed, or if the merged values are invalid. Missing
    /// files are not an error.
    pub fn load(
        project_dir: Option<&Path>,
        profile: Option<&str>,
        overrides: &[String],
    ) -> Result<ConfigLoadResult, ConfigError> {
        let sources = ConfigSources {
            paths: ConfigPaths::platform(profile)?,
            project_dir: project_dir.map(Path::to_path_buf),
            env: std::env::vars().collect(),
            overrides: overrides.to_vec(),
        };
        Self::load_from(&sources)
    }

    /// Load configuration from explicit sources.
    pub fn load_from(sources: &ConfigSources) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        // Parse CLI overrides first so a typo fails before any file I/O.
        let cli: Vec<ConfigOverride> = sources
            .overrides
            .iter()
            .map(|raw| parse_override(raw))
            .collect::<Result<_, _>>()?;

        let mut config = Config {
            data: toml::Table::new(),
            provenance: BTreeMap::new(),
            settings: Settings::default(),
            paths: sources.paths.clone(),
            loaded: Vec::new(),
        };

        let defaults: toml::Table = toml::from_str(DEFAULT_CONFIG).map_err(|e| {
            ConfigError::ParseError {
                path: PathBuf::from("<embedded defaultconfig.toml>"),
                message: e.to_string(),
            }
        })?;
        config.apply(defaults, Layer::Defaults, None);

        let mut files = vec![
            (Layer::App, Some(sources.paths.app.clone())),
            (Layer::Host, Some(sources.paths.host.clone())),
            (Layer::User, sources.paths.user.clone()),
        ];
        if let Some(dir) = &sources.project_dir {
            files.push((Layer::Project, Some(ConfigPaths::project(dir))));
        }

        for (layer, path) in files {
            let Some(path) = path else { continue };
            if let Some(table) = read_layer_file(&path)? {
                tracing::debug!(%layer, path = %path.display(), "loaded config layer");
                config.apply(table, layer, Some(path.display().to_string()));
                config.loaded.push((layer, path));
            }
        }

        let mut env = sources.env.clone();
        env.sort();
        for (name, value) in &env {
            match parse_env_var(name, value) {
                Ok(Some(o)) => config.apply(o.to_table(), Layer::Env, Some(name.clone())),
                Ok(None) => {}
                Err(e) => warnings.push(ConfigWarning {
                    message: e.to_string(),
                    source: name.clone(),
                }),
            }
        }

        for o in cli {
            let source = format!("--set {}", o.key());
            config.apply(o.to_table(), Layer::Cli, Some(source));
        }

        config.settings = Settings::from_table(&config.data)?;

        Ok(ConfigLoadResult { config, warnings })
    }

    fn apply(&mut self, table: toml::Table, layer: Layer, source: Option<String>) {
        let provenance = Provenance { layer, source };
        merge_into(&mut self.data, table, &provenance, "", &mut self.provenance);
    }

    /// Typed settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The merged document.
    pub fn as_table(&self) -> &toml::Table {
        &self.data
    }

    /// A top-level section.
    pub fn section(&self, name: &str) -> Result<&toml::Table, ConfigError> {
        self.data
            .get(name)
            .and_then(toml::Value::as_table)
            .ok_or_else(|| ConfigError::UnknownSection(name.to_string()))
    }

    /// Value at a dotted key path.
    pub fn get(&self, dotted: &str) -> Option<&toml::Value> {
        let mut parts = dotted.split('.');
        let mut value = self.data.get(parts.next()?)?;
        for part in parts {
            value = value.get(part)?;
        }
        Some(value)
    }

    /// Origin of the leaf at a dotted key path.
    pub fn provenance(&self, dotted: &str) -> Option<&Provenance> {
        self.provenance.get(dotted)
    }

    /// Files that contributed a layer, in load order.
    pub fn loaded_files(&self) -> &[(Layer, PathBuf)] {
        &self.loaded
    }

    /// Locations that were searched.
    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }
}

fn read_layer_file(path: &Path) -> Result<Option<toml::Table>, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    toml::from_str(&contents)
        .map(Some)
        .map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn merge_into(
    base: &mut toml::Table,
    overlay: toml::Table,
    provenance: &Provenance,
    prefix: &str,
    record: &mut BTreeMap<String, Provenance>,
) {
    for (key, value) in overlay {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            toml::Value::Table(sub) => {
                let slot = base
                    .entry(key)
                    .or_insert(toml::Value::Table(toml::Table::new()));
                if !slot.is_table() {
                    record.remove(&dotted);
                    *slot = toml::Value::Table(toml::Table::new());
                }
                if let toml::Value::Table(existing) = slot {
                    merge_into(existing, sub, provenance, &dotted, record);
                }
            }
            leaf => {
                let child_prefix = format!("{}.", dotted);
                record.retain(|k, _| !k.starts_with(&child_prefix));
                record.insert(dotted, provenance.clone());
                base.insert(key, leaf);
            }
        }
    }
}

/// Write a file atomically.
///
/// Creates parent directories if needed. Writes to a temp file next to the
/// target, then renames it into place.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(contents.as_bytes())
        .map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

    file.sync_all().map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        sys: PathBuf,
        user: PathBuf,
        project: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let sys = temp.path().join("sys");
            let user = temp.path().join("user");
            let project = temp.path().join("project");
            fs::create_dir_all(&project).unwrap();
            Self {
                sys,
                user,
                project,
                _temp: temp,
            }
        }

        fn sources(&self, env: &[(&str, &str)], overrides: &[&str]) -> ConfigSources {
            ConfigSources {
                paths: ConfigPaths::from_dirs(&self.sys, Some(&self.user), "testhost", None)
                    .unwrap(),
                project_dir: Some(self.project.clone()),
                env: env
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                overrides: overrides.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn write(&self, path: PathBuf, contents: &str) {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        fn load(&self, env: &[(&str, &str)], overrides: &[&str]) -> ConfigLoadResult {
            Config::load_from(&self.sources(env, overrides)).unwrap()
        }
    }

    #[test]
    fn defaults_only() {
        let fx = Fixture::new();
        let result = fx.load(&[], &[]);
        let config = result.config;

        assert_eq!(config.settings().logging.level, "warn");
        assert_eq!(config.settings().bmk.override_dir(), Some("makescripts"));
        assert_eq!(
            config.provenance("logging.level").unwrap().layer,
            Layer::Defaults
        );
        assert!(config.loaded_files().is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn layers_apply_in_order() {
        let fx = Fixture::new();
        fx.write(fx.sys.join("config.toml"), "[logging]\nlevel = \"error\"\n[bmk]\nscripts_dir = \"/opt/s\"\n");
        fx.write(fx.sys.join("hosts/testhost.toml"), "[logging]\nlevel = \"info\"\n");
        fx.write(fx.user.join("config.toml"), "[logging]\nlevel = \"debug\"\n");

        let config = fx.load(&[], &[]).config;

        assert_eq!(config.settings().logging.level, "debug");
        assert_eq!(config.provenance("logging.level").unwrap().layer, Layer::User);
        assert_eq!(config.settings().bmk.scripts_dir(), Some("/opt/s"));
        assert_eq!(config.provenance("bmk.scripts_dir").unwrap().layer, Layer::App);
        let layers: Vec<_> = config.loaded_files().iter().map(|(l, _)| *l).collect();
        assert_eq!(layers, vec![Layer::App, Layer::Host, Layer::User]);
    }

    #[test]
    fn project_env_and_cli_precedence() {
        let fx = Fixture::new();
        fx.write(
            fx.project.join(".bmk.toml"),
            "[bmk]\npackage_name = \"from_project\"\nshow_warnings = false\n",
        );

        let config = fx
            .load(
                &[("BMK___BMK__PACKAGE_NAME", "from_env")],
                &["bmk.override_dir=scripts"],
            )
            .config;

        assert_eq!(config.settings().bmk.package_name(), Some("from_env"));
        assert_eq!(config.provenance("bmk.package_name").unwrap().layer, Layer::Env);
        assert!(!config.settings().bmk.show_warnings);
        assert_eq!(
            config.provenance("bmk.show_warnings").unwrap().layer,
            Layer::Project
        );
        assert_eq!(config.settings().bmk.override_dir(), Some("scripts"));
        assert_eq!(config.provenance("bmk.override_dir").unwrap().layer, Layer::Cli);
    }

    #[test]
    fn cli_beats_env() {
        let fx = Fixture::new();
        let config = fx
            .load(&[("BMK___LOGGING__LEVEL", "info")], &["logging.level=error"])
            .config;
        assert_eq!(config.settings().logging.level, "error");
    }

    #[test]
    fn unknown_sections_are_kept() {
        let fx = Fixture::new();
        fx.write(fx.user.join("config.toml"), "[team]\nowner = \"qa\"\n");

        let config = fx.load(&[], &[]).config;

        assert_eq!(config.get("team.owner").and_then(|v| v.as_str()), Some("qa"));
        assert!(config.section("team").is_ok());
        assert!(matches!(
            config.section("nope"),
            Err(ConfigError::UnknownSection(_))
        ));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let fx = Fixture::new();
        fx.write(fx.user.join("config.toml"), "[logging\nlevel=");

        let err = Config::load_from(&fx.sources(&[], &[])).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn malformed_override_is_error() {
        let fx = Fixture::new();
        let err = Config::load_from(&fx.sources(&[], &["nodot=1"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { .. }));
    }

    #[test]
    fn malformed_env_var_warns() {
        let fx = Fixture::new();
        let result = fx.load(&[("BMK___ONLYSECTION", "1")], &[]);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].source, "BMK___ONLYSECTION");
    }

    #[test]
    fn invalid_value_rejected() {
        let fx = Fixture::new();
        let err = Config::load_from(&fx.sources(&[], &["logging.level=chatty"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn scalar_replaced_by_table_drops_stale_provenance() {
        let mut base = toml::Table::new();
        let mut record = BTreeMap::new();
        let p = |layer| Provenance {
            layer,
            source: None,
        };

        merge_into(
            &mut base,
            toml::from_str("[a]\nb = 1\nc = 2\n").unwrap(),
            &p(Layer::Defaults),
            "",
            &mut record,
        );
        merge_into(
            &mut base,
            toml::from_str("a = 5\n").unwrap(),
            &p(Layer::Cli),
            "",
            &mut record,
        );

        assert_eq!(base["a"].as_integer(), Some(5));
        assert!(record.get("a.b").is_none());
        assert_eq!(record["a"].layer, Layer::Cli);
    }

    #[test]
    fn atomic_write_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/config.toml");
        write_atomic(&path, "x = 1\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x = 1\n");
        assert!(!path.with_extension("toml.tmp").exists());
    }
}
