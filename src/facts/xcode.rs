use crate::metrics::XcodeVersion;
use std::collections::HashMap;
use std::env;

/// Set by Xcode for build phases, e.g. `15E204a`
pub const XCODE_BUILD_NUMBER_KEY: &str = "XCODE_PRODUCT_BUILD_VERSION";
/// Set by Xcode for build phases, e.g. `1530`
pub const XCODE_VERSION_KEY: &str = "XCODE_VERSION_ACTUAL";

pub trait XcodeVersionSource: Send + Sync {
    /// `None` when not running under Xcode
    fn fetch(&self) -> Option<XcodeVersion>;
}

/// Reads the Xcode version from a snapshot of environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvXcodeFacts {
    environment: HashMap<String, String>,
}

impl EnvXcodeFacts {
    /// Snapshot of the current process environment
    pub fn from_env() -> Self {
        Self {
            environment: env::vars().collect(),
        }
    }

    pub fn from_map(environment: HashMap<String, String>) -> Self {
        Self { environment }
    }
}

impl XcodeVersionSource for EnvXcodeFacts {
    fn fetch(&self) -> Option<XcodeVersion> {
        let build_number = self.environment.get(XCODE_BUILD_NUMBER_KEY)?;
        let version = self.environment.get(XCODE_VERSION_KEY)?;
        Some(XcodeVersion {
            build_number: build_number.clone(),
            version: version.clone(),
        })
    }
}
