//! Pipeline collaborators and per-run inputs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::XcdogConfig;
use crate::discovery::{LogDiscovery, SystemClock};
use crate::facts::{EnvXcodeFacts, HostFactsFetcher, SysinfoHostFacts, XcodeVersionSource};
use crate::fs::RealFileSystem;
use crate::parser::{LogParser, XcLogParserCli};
use crate::upload::{Credentials, DatadogUploader, MetricsUploader, UploadError};

/// Owns every long-lived dependency of a metrics run
#[derive(Clone)]
pub struct PipelineContext {
    pub discovery: LogDiscovery,
    pub parser: Arc<dyn LogParser>,
    pub host_facts: Arc<dyn HostFactsFetcher>,
    pub xcode_facts: Arc<dyn XcodeVersionSource>,
    pub uploader: Arc<dyn MetricsUploader>,
}

impl PipelineContext {
    pub fn new(
        discovery: LogDiscovery,
        parser: Arc<dyn LogParser>,
        host_facts: Arc<dyn HostFactsFetcher>,
        xcode_facts: Arc<dyn XcodeVersionSource>,
        uploader: Arc<dyn MetricsUploader>,
    ) -> Self {
        Self {
            discovery,
            parser,
            host_facts,
            xcode_facts,
            uploader,
        }
    }

    /// Real file system, wall clock, `xclogparser`, sysinfo and Datadog
    pub fn from_config(config: &XcdogConfig, machine_name: &str) -> Result<Self, UploadError> {
        let discovery = LogDiscovery::new(Arc::new(RealFileSystem::new()), Arc::new(SystemClock));

        let mut parser = XcLogParserCli::new(&config.xclogparser_binary);
        if !machine_name.is_empty() {
            parser = parser.with_machine_name(machine_name);
        }

        let uploader = DatadogUploader::new(
            config.intake_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;

        Ok(Self::new(
            discovery,
            Arc::new(parser),
            Arc::new(SysinfoHostFacts),
            Arc::new(EnvXcodeFacts::from_env()),
            Arc::new(uploader),
        ))
    }
}

/// Inputs for one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub build_dir: PathBuf,
    pub timeout_secs: u64,
    pub is_ci: bool,
    pub hostname: String,
    pub project_name: Option<String>,
    pub credentials: Credentials,
    /// Assemble metrics without sending them
    pub dry_run: bool,
}

impl RunRequest {
    pub fn new(build_dir: impl Into<PathBuf>, timeout_secs: u64, credentials: Credentials) -> Self {
        Self {
            build_dir: build_dir.into(),
            timeout_secs,
            is_ci: false,
            hostname: String::new(),
            project_name: None,
            credentials,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_request_defaults() {
        let request = RunRequest::new("/tmp/build", 10, Credentials::new("api", "app"));

        assert_eq!(request.build_dir, PathBuf::from("/tmp/build"));
        assert_eq!(request.timeout_secs, 10);
        assert!(!request.is_ci);
        assert!(!request.dry_run);
        assert!(request.project_name.is_none());
    }

    #[test]
    fn test_context_from_default_config() {
        let config = XcdogConfig {
            timeout_secs: 10,
            intake_url: "http://localhost:1/api/v2/logs".to_string(),
            request_timeout_secs: 5,
            xclogparser_binary: "xclogparser".to_string(),
            log_level: "info".to_string(),
            log_json: false,
        };

        assert!(PipelineContext::from_config(&config, "build-mac").is_ok());
    }
}
