//! logging
//!
//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr through `tracing`; command results are printed
//! by [`crate::ui::output`] and are not affected by the log level.
//!
//! Level precedence, highest first: the `BMK_LOG` filter, `--debug`,
//! `--quiet` (errors only), `[logging].level`, then `warn`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "BMK_LOG";

/// Default level when nothing else is configured.
pub const DEFAULT_LEVEL: &str = "warn";

/// Pick the filter directive from flags and configuration.
///
/// `env_filter` is the raw value of [`LOG_ENV`], if set.
pub fn resolve_directive(
    env_filter: Option<&str>,
    debug: bool,
    quiet: bool,
    config_level: Option<&str>,
) -> String {
    if let Some(env) = env_filter.map(str::trim).filter(|s| !s.is_empty()) {
        return env.to_string();
    }
    if debug {
        return "debug".to_string();
    }
    if quiet {
        return "error".to_string();
    }
    config_level
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_LEVEL)
        .to_string()
}

/// Install the global subscriber.
///
/// Safe to call more than once; later calls are ignored. An invalid
/// directive falls back to [`DEFAULT_LEVEL`].
pub fn init(debug: bool, quiet: bool, config_level: Option<&str>) {
    let env = std::env::var(LOG_ENV).ok();
    let directive = resolve_directive(env.as_deref(), debug, quiet, config_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_wins() {
        assert_eq!(
            resolve_directive(Some("bmk=trace"), true, true, Some("info")),
            "bmk=trace"
        );
    }

    #[test]
    fn debug_beats_quiet() {
        assert_eq!(resolve_directive(None, true, true, None), "debug");
    }

    #[test]
    fn quiet_beats_config() {
        assert_eq!(resolve_directive(None, false, true, Some("info")), "error");
    }

    #[test]
    fn config_then_default() {
        assert_eq!(resolve_directive(None, false, false, Some("info")), "info");
        assert_eq!(resolve_directive(Some("  "), false, false, None), "warn");
    }
}
