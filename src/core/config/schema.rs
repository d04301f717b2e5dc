//! core::config::schema
//!
//! Typed view of the merged configuration.
//!
//! # Sections
//!
//! ```toml
//! [bmk]
//! override_dir = "makescripts"
//! scripts_dir = ""
//! package_name = ""
//! show_warnings = true
//!
//! [logging]
//! level = "warn"
//!
//! [deploy.permissions]
//! enabled = true
//! app_directory = "755"
//! user_file = "600"
//! ```
//!
//! Unknown top-level sections are allowed and only shown by `bmk config`.
//! Known sections reject unknown keys. Empty strings mean "unset".

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Settings bmk itself reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub bmk: BmkSection,
    pub logging: LoggingSection,
    pub deploy: DeploySection,
}

/// `[bmk]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BmkSection {
    /// Project-local stage script directory, relative to the project root.
    pub override_dir: String,

    /// Bundled stage script directory.
    pub scripts_dir: String,

    /// Replaces the derived package name in the stage environment.
    pub package_name: String,

    /// Exported to stage scripts as `BMK_SHOW_WARNINGS`.
    pub show_warnings: bool,
}

impl Default for BmkSection {
    fn default() -> Self {
        Self {
            override_dir: "makescripts".to_string(),
            scripts_dir: String::new(),
            package_name: String::new(),
            show_warnings: true,
        }
    }
}

impl BmkSection {
    pub fn override_dir(&self) -> Option<&str> {
        non_empty(&self.override_dir)
    }

    pub fn scripts_dir(&self) -> Option<&str> {
        non_empty(&self.scripts_dir)
    }

    pub fn package_name(&self) -> Option<&str> {
        non_empty(&self.package_name)
    }
}

/// `[logging]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Default tracing level when neither `BMK_LOG` nor a flag decides.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Accepted `[logging].level` values.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// `[deploy]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DeploySection {
    pub permissions: PermissionSettings,
}

/// A file mode given as an integer or an octal string (`"755"`, `"0o755"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ModeValue {
    Int(u32),
    Octal(String),
}

impl ModeValue {
    /// Integer mode.
    ///
    /// Integers are read as written in octal, so `755` and `"755"` agree.
    pub fn to_mode(&self) -> Result<u32, ConfigError> {
        let digits = match self {
            ModeValue::Int(n) => n.to_string(),
            ModeValue::Octal(s) => s.trim().trim_start_matches("0o").to_string(),
        };
        parse_octal(&digits)
    }
}

/// Parse an octal mode string such as `755` or `0o750`.
pub fn parse_octal(s: &str) -> Result<u32, ConfigError> {
    let digits = s.trim().trim_start_matches("0o");
    let mode = u32::from_str_radix(digits, 8)
        .map_err(|_| ConfigError::InvalidValue(format!("invalid permission mode '{}'", s)))?;
    if digits.is_empty() || mode > 0o7777 {
        return Err(ConfigError::InvalidValue(format!(
            "invalid permission mode '{}'",
            s
        )));
    }
    Ok(mode)
}

/// `[deploy.permissions]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PermissionSettings {
    pub enabled: bool,
    pub app_directory: ModeValue,
    pub app_file: ModeValue,
    pub host_directory: ModeValue,
    pub host_file: ModeValue,
    pub user_directory: ModeValue,
    pub user_file: ModeValue,
}

impl Default for PermissionSettings {
    fn default() -> Self {
        let mode = |s: &str| ModeValue::Octal(s.to_string());
        Self {
            enabled: true,
            app_directory: mode("755"),
            app_file: mode("644"),
            host_directory: mode("755"),
            host_file: mode("644"),
            user_directory: mode("700"),
            user_file: mode("600"),
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl Settings {
    /// Extract settings from a merged table.
    pub fn from_table(table: &toml::Table) -> Result<Self, ConfigError> {
        let settings: Settings = toml::Value::Table(table.clone())
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::InvalidValue(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue(format!(
                "invalid logging level '{}', must be one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        let p = &self.deploy.permissions;
        for mode in [
            &p.app_directory,
            &p.app_file,
            &p.host_directory,
            &p.host_file,
            &p.user_directory,
            &p.user_file,
        ] {
            mode.to_mode()?;
        }
        Ok(())
    }
}
