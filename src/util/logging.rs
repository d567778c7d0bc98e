//! Structured logging setup
//!
//! Logs go to stderr so the metrics record printed on stdout stays machine
//! readable. When `RUST_LOG` is set it replaces the configured level entirely;
//! otherwise xcdog logs at the configured level and the HTTP stack is capped
//! at `warn`.
//!
//! ```no_run
//! use xcdog::util::{init_logging, LoggingConfig};
//! use tracing::Level;
//!
//! init_logging(LoggingConfig::with_level(Level::DEBUG));
//! tracing::info!(build_dir = "/tmp/build", "Collecting metrics");
//! ```

use crate::config::XcdogConfig;
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Crates whose chatter is capped unless `RUST_LOG` says otherwise
const QUIET_DEPENDENCIES: &[&str] = &["h2", "hyper", "hyper_util", "reqwest"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,

    /// Emit one JSON object per event
    pub use_json: bool,

    pub include_target: bool,

    /// Include file and line number
    pub include_location: bool,

    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Level and format from `XCDOG_LOG_LEVEL` / `XCDOG_LOG_JSON`. An unknown
    /// level falls back to `INFO`; `XcdogConfig::validate` reports it.
    pub fn from_config(config: &XcdogConfig) -> Self {
        Self {
            level: parse_level(&config.log_level).unwrap_or(Level::INFO),
            use_json: config.log_json,
            ..Default::default()
        }
    }
}

/// Case-insensitive level name, `None` if unknown
pub fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn directive(raw: String) -> Option<Directive> {
    raw.parse().ok()
}

pub(crate) fn build_filter(level: Level, rust_log_set: bool) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    if rust_log_set {
        return filter;
    }

    if let Some(own) = directive(format!("{}={}", crate::NAME, level.as_str().to_lowercase())) {
        filter = filter.add_directive(own);
    }
    for dependency in QUIET_DEPENDENCIES {
        if let Some(quiet) = directive(format!("{}=warn", dependency)) {
            filter = filter.add_directive(quiet);
        }
    }
    filter
}

/// Installs the global subscriber. Only the first call has an effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level, env::var("RUST_LOG").is_ok());

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread_ids)
            .with_thread_names(config.include_thread_ids);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level("info"), Some(Level::INFO));
        assert_eq!(parse_level("warn"), Some(Level::WARN));
        assert_eq!(parse_level("error"), Some(Level::ERROR));
    }

    #[test]
    fn test_parse_level_case_insensitive() {
        assert_eq!(parse_level("TRACE"), Some(Level::TRACE));
        assert_eq!(parse_level("Debug"), Some(Level::DEBUG));
    }

    #[test]
    fn test_parse_level_invalid() {
        assert_eq!(parse_level("verbose"), None);
        assert_eq!(parse_level(""), None);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(!config.include_location);
    }

    fn xcdog_config(log_level: &str, log_json: bool) -> XcdogConfig {
        XcdogConfig {
            timeout_secs: 10,
            intake_url: "https://example.com/logs".to_string(),
            request_timeout_secs: 30,
            xclogparser_binary: "xclogparser".to_string(),
            log_level: log_level.to_string(),
            log_json,
        }
    }

    #[test]
    fn test_from_config() {
        let config = LoggingConfig::from_config(&xcdog_config("debug", true));
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.use_json);
    }

    #[test]
    fn test_from_config_unknown_level_falls_back_to_info() {
        let config = LoggingConfig::from_config(&xcdog_config("loud", false));
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
    }

    #[test]
    fn test_filter_caps_http_stack() {
        let filter = build_filter(Level::DEBUG, false).to_string();
        assert!(filter.contains("xcdog=debug"));
        assert!(filter.contains("reqwest=warn"));
        assert!(filter.contains("hyper=warn"));
    }

    #[test]
    fn test_filter_defers_to_rust_log() {
        let filter = build_filter(Level::DEBUG, true).to_string();
        assert!(!filter.contains("xcdog=debug"));
        assert!(!filter.contains("reqwest=warn"));
    }
}
