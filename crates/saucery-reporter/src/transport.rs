//! HTTP transport for job status updates

use async_trait::async_trait;
use saucery_core::{Credentials, Result, SauceConfig, SauceError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Raw response from the job status endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends job status payloads to Sauce Labs
#[async_trait]
pub trait JobStatusTransport: Send + Sync {
    /// PUT `payload` to `url` with basic authentication
    async fn put_job_status(
        &self,
        url: &str,
        credentials: &Credentials,
        payload: String,
    ) -> Result<TransportResponse>;
}

#[async_trait]
impl<T: JobStatusTransport + ?Sized> JobStatusTransport for Arc<T> {
    async fn put_job_status(
        &self,
        url: &str,
        credentials: &Credentials,
        payload: String,
    ) -> Result<TransportResponse> {
        (**self).put_job_status(url, credentials, payload).await
    }
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Build a client honouring the configured request timeout
    pub fn from_config(config: &SauceConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| SauceError::transport("Failed to build HTTP client", e))?;

        Ok(Self { client })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStatusTransport for HttpTransport {
    async fn put_job_status(
        &self,
        url: &str,
        credentials: &Credentials,
        payload: String,
    ) -> Result<TransportResponse> {
        debug!("PUT {} ({} bytes)", url, payload.len());

        let response = self
            .client
            .put(url)
            .basic_auth(&credentials.user, Some(&credentials.access_key))
            .header("content-type", "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| SauceError::transport(format!("Failed to send job update to {}", url), e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SauceError::transport("Failed to read job update response", e))?;

        debug!("Job update answered {} ({} bytes)", status, body.len());

        Ok(TransportResponse { status, body })
    }
}
