//! core::config::overrides
//!
//! `--set SECTION.KEY[.SUB...]=VALUE` and `BMK___SECTION__KEY=VALUE` parsing.
//!
//! Values are coerced as JSON (booleans, numbers, arrays, objects) and fall
//! back to the raw string. TOML has no null, so `null` stays the string
//! `"null"`.
//!
//! # Example
//!
//! ```
//! use bmk::core::config::overrides::parse_override;
//!
//! let o = parse_override("logging.level=debug").unwrap();
//! assert_eq!(o.path, vec!["logging", "level"]);
//! assert_eq!(o.value.as_str(), Some("debug"));
//!
//! let o = parse_override("bmk.show_warnings=false").unwrap();
//! assert_eq!(o.value.as_bool(), Some(false));
//! ```

use super::ConfigError;

/// Prefix of environment variables that feed the env layer.
pub const ENV_PREFIX: &str = "BMK___";

/// One parsed override.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOverride {
    /// Section followed by the key path; at least two components.
    pub path: Vec<String>,
    pub value: toml::Value,
}

impl ConfigOverride {
    /// Dotted key, e.g. `logging.level`.
    pub fn key(&self) -> String {
        self.path.join(".")
    }

    /// The override as a nested table ready to merge.
    pub fn to_table(&self) -> toml::Table {
        let mut value = self.value.clone();
        for part in self.path[1..].iter().rev() {
            let mut table = toml::Table::new();
            table.insert(part.clone(), value);
            value = toml::Value::Table(table);
        }
        let mut root = toml::Table::new();
        root.insert(self.path[0].clone(), value);
        root
    }
}

/// Parse a `--set` argument.
pub fn parse_override(raw: &str) -> Result<ConfigOverride, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidOverride {
        raw: raw.to_string(),
        reason: reason.to_string(),
    };

    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| invalid("must contain '='"))?;
    if !path.contains('.') {
        return Err(invalid("key must contain at least one dot (SECTION.KEY)"));
    }

    let parts: Vec<String> = path.split('.').map(str::to_string).collect();
    if parts[0].is_empty() {
        return Err(invalid("section name is empty"));
    }
    if parts.iter().any(String::is_empty) {
        return Err(invalid("key path contains an empty component"));
    }

    Ok(ConfigOverride {
        path: parts,
        value: coerce_value(value),
    })
}

/// Parse one environment variable of the form `BMK___SECTION__KEY`.
///
/// Returns `Ok(None)` for variables that do not carry the prefix.
pub fn parse_env_var(name: &str, value: &str) -> Result<Option<ConfigOverride>, ConfigError> {
    let Some(rest) = name.strip_prefix(ENV_PREFIX) else {
        return Ok(None);
    };

    let parts: Vec<String> = rest.split("__").map(str::to_ascii_lowercase).collect();
    if parts.len() < 2 || parts.iter().any(String::is_empty) {
        return Err(ConfigError::InvalidOverride {
            raw: name.to_string(),
            reason: "expected BMK___SECTION__KEY".to_string(),
        });
    }

    Ok(Some(ConfigOverride {
        path: parts,
        value: coerce_value(value),
    }))
}

/// Coerce a raw value: JSON first, raw string otherwise.
pub fn coerce_value(raw: &str) -> toml::Value {
    if raw.is_empty() {
        return toml::Value::String(String::new());
    }
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(json_to_toml)
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}

fn json_to_toml(value: serde_json::Value) -> Option<toml::Value> {
    use serde_json::Value as J;

    Some(match value {
        J::Null => return None,
        J::Bool(b) => toml::Value::Boolean(b),
        J::Number(n) => match n.as_i64() {
            Some(i) => toml::Value::Integer(i),
            None => toml::Value::Float(n.as_f64()?),
        },
        J::String(s) => toml::Value::String(s),
        J::Array(items) => toml::Value::Array(
            items
                .into_iter()
                .map(json_to_toml)
                .collect::<Option<Vec<_>>>()?,
        ),
        J::Object(map) => toml::Value::Table(
            map.into_iter()
                .map(|(k, v)| json_to_toml(v).map(|v| (k, v)))
                .collect::<Option<toml::Table>>()?,
        ),
    })
}
