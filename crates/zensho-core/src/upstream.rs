//! Upstream HTTP API client
//!
//! The dispatcher talks to the upstream through the [`Upstream`] trait so tests
//! can swap the real client for an in-process double. [`HttpUpstream`] is the
//! production implementation: one JSON POST per call, no retries, transport
//! default timeouts.

use std::error::Error as _;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::config::Config;
use crate::{Error, Result};

/// Raw HTTP outcome of an upstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    /// Reason phrase of the status line, empty when unknown
    pub reason: String,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    /// Response with the canonical reason phrase for `status`
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            reason: canonical_reason(status).to_string(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// The request never produced a response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub message: String,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Transport used by the dispatcher to reach the upstream API
#[async_trait]
pub trait Upstream: Send + Sync {
    /// POST `body` as JSON to `endpoint` and return the raw response
    async fn post(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> std::result::Result<UpstreamResponse, UpstreamError>;
}

/// reqwest-backed upstream client
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    config: Config,
    http: reqwest::Client,
}

impl HttpUpstream {
    /// Create a client for the configured base URL and static headers
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        for (name, value) in &config.upstream.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::InvalidConfig {
                    message: format!("invalid header name {}: {}", name, e),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| Error::InvalidConfig {
                message: format!("invalid value for header {}: {}", name.as_str(), e),
            })?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(Self {
            config: config.clone(),
            http,
        })
    }

    /// Create a client around an existing reqwest client
    pub fn with_client(config: &Config, http: reqwest::Client) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            http,
        })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn post(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> std::result::Result<UpstreamResponse, UpstreamError> {
        let url = self.config.endpoint_url(endpoint);
        let payload = serde_json::to_vec(body).map_err(|e| UpstreamError::new(e.to_string()))?;

        tracing::debug!(url = %url, "POST upstream");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| UpstreamError::new(describe(&e)))?;

        let status = response.status();
        let body = if status.is_success() {
            response
                .bytes()
                .await
                .map_err(|e| UpstreamError::new(describe(&e)))?
                .to_vec()
        } else {
            // The status line decides the outcome; the body is optional detail
            match response.bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    tracing::debug!(status = status.as_u16(), error = %describe(&e), "Unreadable error body");
                    Vec::new()
                }
            }
        };

        Ok(UpstreamResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

/// reqwest's top-level message hides the cause; include the source chain
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
}
