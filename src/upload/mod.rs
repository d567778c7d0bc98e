//! Delivery of metrics to the ingestion endpoint

pub mod datadog;

pub use datadog::{DatadogUploader, DEFAULT_INTAKE_URL};

use crate::metrics::BuildMetrics;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
    #[error("Request to metrics intake failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Metrics intake rejected payload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// API credentials for the intake
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub application_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, application_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            application_key: application_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("application_key", &"<redacted>")
            .finish()
    }
}

/// One log entry wrapping a metrics record
#[derive(Debug, Clone, Serialize)]
pub struct LogPayload {
    pub hostname: String,
    pub ddsource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub message: BuildMetrics,
}

impl LogPayload {
    pub fn new(hostname: impl Into<String>, service: Option<String>, message: BuildMetrics) -> Self {
        Self {
            hostname: hostname.into(),
            ddsource: crate::NAME.to_string(),
            service,
            message,
        }
    }
}

/// Sends a metrics payload once; callers decide what a failure means
#[async_trait]
pub trait MetricsUploader: Send + Sync {
    async fn send(&self, payload: &LogPayload, credentials: &Credentials)
        -> Result<(), UploadError>;
}
