//! Datadog logs intake client

use super::{Credentials, LogPayload, MetricsUploader, UploadError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_INTAKE_URL: &str = "https://http-intake.logs.datadoghq.eu/api/v2/logs";

const API_KEY_HEADER: &str = "DD-API-KEY";
const APPLICATION_KEY_HEADER: &str = "DD-APPLICATION-KEY";

pub struct DatadogUploader {
    intake_url: String,
    http_client: Client,
}

impl DatadogUploader {
    pub fn new(intake_url: impl Into<String>, timeout: Duration) -> Result<Self, UploadError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::Client(e.to_string()))?;

        Ok(Self {
            intake_url: intake_url.into(),
            http_client,
        })
    }
}

#[async_trait]
impl MetricsUploader for DatadogUploader {
    async fn send(
        &self,
        payload: &LogPayload,
        credentials: &Credentials,
    ) -> Result<(), UploadError> {
        debug!(url = %self.intake_url, "Sending metrics");

        let response = self
            .http_client
            .post(&self.intake_url)
            .header(API_KEY_HEADER, &credentials.api_key)
            .header(APPLICATION_KEY_HEADER, &credentials.application_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %body, "Intake response");

        if !status.is_success() {
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(status = status.as_u16(), "Metrics delivered");
        Ok(())
    }
}
