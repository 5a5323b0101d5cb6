//! Structured logging foundation.
//!
//! Logs go to stderr, either human-readable or as JSON lines; stdout stays
//! reserved for result payloads. There is no level enum of our own: the
//! filter is a raw tracing-subscriber directive (`"info"`, `"lt_core=debug"`,
//! `"warn,lt_core::pipeline=trace"`), so anything `EnvFilter` accepts works
//! here. Precedence: `RUST_LOG` > explicit value > `LT_LOG` > `"info"`.

use tracing_subscriber::EnvFilter;

/// Logging configuration: a filter directive plus an output-shape switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// tracing-subscriber filter directive, e.g. `info` or `lt_core=debug`.
    pub filter: String,
    /// Emit JSON lines instead of the human console format.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Build from the environment (`LT_LOG`, `LT_LOG_JSON`), with explicit
    /// values taking precedence over both.
    pub fn from_env(filter: Option<String>, json: Option<bool>) -> Self {
        let env_filter = std::env::var("LT_LOG").ok().filter(|s| !s.trim().is_empty());
        let env_json = std::env::var("LT_LOG_JSON")
            .ok()
            .map(|s| json_switch(&s));
        let defaults = LogConfig::default();
        LogConfig {
            filter: filter.or(env_filter).unwrap_or(defaults.filter),
            json: json.or(env_json).unwrap_or(defaults.json),
        }
    }
}

/// Truthy forms accepted for `LT_LOG_JSON`.
fn json_switch(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops. `RUST_LOG`
/// overrides the configured filter when present. An unparseable filter
/// falls back to the default rather than failing startup.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new(LogConfig::default().filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A second init (e.g. in tests) keeps the first subscriber.
    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_human_info() {
        let config = LogConfig::default();
        assert_eq!(config.filter, "info");
        assert!(!config.json);
    }

    #[test]
    fn explicit_values_beat_environment() {
        let config = LogConfig::from_env(Some("lt_core=debug".to_string()), Some(true));
        assert_eq!(config.filter, "lt_core=debug");
        assert!(config.json);
    }

    #[test]
    fn json_switch_accepts_truthy_forms() {
        for raw in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(json_switch(raw), "{raw:?} should enable JSON");
        }
        for raw in ["0", "false", "off", "", "jsonl"] {
            assert!(!json_switch(raw), "{raw:?} should stay human");
        }
    }

    #[test]
    fn directives_pass_through_unparsed() {
        let config = LogConfig::from_env(
            Some("warn,lt_core::pipeline=trace".to_string()),
            None,
        );
        assert_eq!(config.filter, "warn,lt_core::pipeline=trace");
    }
}
