//! Test doubles for the transport seam

use crate::transport::{JobStatusTransport, TransportResponse};
use async_trait::async_trait;
use saucery_core::{Credentials, Result, SauceError};
use std::sync::Mutex;

/// A request captured by [`RecordingTransport`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub credentials: Credentials,
    pub payload: String,
}

/// Records every request and answers with a canned response
pub struct RecordingTransport {
    status: u16,
    body: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    pub fn ok(body: &str) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl JobStatusTransport for RecordingTransport {
    async fn put_job_status(
        &self,
        url: &str,
        credentials: &Credentials,
        payload: String,
    ) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            credentials: credentials.clone(),
            payload,
        });
        Ok(TransportResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Fails every request as if the connection was refused
pub struct FailingTransport;

#[async_trait]
impl JobStatusTransport for FailingTransport {
    async fn put_job_status(
        &self,
        _url: &str,
        _credentials: &Credentials,
        _payload: String,
    ) -> Result<TransportResponse> {
        Err(SauceError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        )))
    }
}

pub const VIDEO_RESPONSE: &str = "{\n  \"id\": \"abc\",\n  \"video_url\": \"http://x.com/jobs/abc/video.flv\",\n  \"passed\": true\n}";
