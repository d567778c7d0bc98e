//! Configuration management for xcdog
//!
//! Settings are loaded from environment variables with defaults. Command-line
//! flags override whatever is loaded here.
//!
//! # Environment Variables
//!
//! - `XCDOG_TIMEOUT`: Seconds to wait for a new build log - default: "10"
//! - `XCDOG_INTAKE_URL`: Datadog logs intake endpoint - default: EU intake
//! - `XCDOG_REQUEST_TIMEOUT`: Upload request timeout in seconds - default: "30"
//! - `XCDOG_XCLOGPARSER`: Path or name of the `xclogparser` binary - default: "xclogparser"
//! - `XCDOG_LOG_LEVEL`: Logging level - default: "info"
//! - `XCDOG_LOG_JSON`: Emit logs as JSON lines - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use xcdog::XcdogConfig;
//!
//! let config = XcdogConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::parser::DEFAULT_XCLOGPARSER_BINARY;
use crate::upload::DEFAULT_INTAKE_URL;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";
const MAX_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone)]
pub struct XcdogConfig {
    /// Seconds to poll for a new build log
    pub timeout_secs: u64,

    pub intake_url: String,

    /// Upload request timeout in seconds
    pub request_timeout_secs: u64,

    pub xclogparser_binary: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    pub log_json: bool,
}

impl Default for XcdogConfig {
    /// Loads `XCDOG_*` environment variables, falling back to defaults for
    /// anything missing or unparsable.
    fn default() -> Self {
        let timeout_secs = env::var("XCDOG_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let intake_url =
            env::var("XCDOG_INTAKE_URL").unwrap_or_else(|_| DEFAULT_INTAKE_URL.to_string());

        let request_timeout_secs = env::var("XCDOG_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let xclogparser_binary = env::var("XCDOG_XCLOGPARSER")
            .unwrap_or_else(|_| DEFAULT_XCLOGPARSER_BINARY.to_string());

        let log_level = env::var("XCDOG_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = env::var("XCDOG_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            timeout_secs,
            intake_url,
            request_timeout_secs,
            xclogparser_binary,
            log_level,
            log_json,
        }
    }
}

impl XcdogConfig {
    /// Checks that timeouts are within 1s..=10min, the intake URL is HTTP(S)
    /// and the log level is known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_seconds("Timeout", self.timeout_secs)?;
        validate_seconds("Request timeout", self.request_timeout_secs)?;

        if !(self.intake_url.starts_with("http://") || self.intake_url.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(format!(
                "Intake URL must use http or https: {}",
                self.intake_url
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("timeout_secs".to_string(), self.timeout_secs.to_string());
        map.insert("intake_url".to_string(), self.intake_url.clone());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert(
            "xclogparser_binary".to_string(),
            self.xclogparser_binary.clone(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert("log_json".to_string(), self.log_json.to_string());

        map
    }
}

fn validate_seconds(name: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ValidationFailed(format!(
            "{} must be at least 1 second",
            name
        )));
    }
    if value > MAX_TIMEOUT_SECS {
        return Err(ConfigError::ValidationFailed(format!(
            "{} cannot exceed 10 minutes",
            name
        )));
    }
    Ok(())
}

impl fmt::Display for XcdogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Xcdog Configuration:")?;
        writeln!(f, "  Log Timeout: {}s", self.timeout_secs)?;
        writeln!(f, "  Intake URL: {}", self.intake_url)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  xclogparser: {}", self.xclogparser_binary)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  JSON Logs: {}", self.log_json)?;
        Ok(())
    }
}
