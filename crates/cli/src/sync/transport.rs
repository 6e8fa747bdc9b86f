// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for pushing payloads to a sync endpoint.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP requests for production
//! - Mock transports for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use ss_core::SyncResponse;

/// Header carrying the stable device identifier.
pub const DEVICE_ID_HEADER: &str = "X-Device-Id";

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// Reading the response failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// A full-state write of one store.
#[derive(Debug, Clone, PartialEq)]
pub struct PushRequest {
    pub endpoint: String,
    pub device_id: String,
    /// The bare payload, serialized.
    pub body: Value,
}

/// What the endpoint answered.
#[derive(Debug, Clone, PartialEq)]
pub struct PushResponse {
    pub status: u16,
    /// Parsed body; `None` when the body was empty or not a sync response.
    pub body: Option<SyncResponse<Value>>,
}

impl PushResponse {
    /// Creates a response with the given status and body.
    pub fn new(status: u16, body: Option<SyncResponse<Value>>) -> Self {
        PushResponse { status, body }
    }

    /// A 200 carrying `{"success": true}`.
    pub fn ok() -> Self {
        Self::new(200, Some(SyncResponse::ok()))
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport trait for full-state writes.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync + 'static {
    /// Writes the request body to its endpoint with a PUT.
    ///
    /// Only failures to complete the exchange are errors; any HTTP status
    /// is reported through [`PushResponse`].
    fn put(
        &self,
        request: PushRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<PushResponse>> + Send + '_>>;
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    auth_token: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    ///
    /// `auth_token` is sent as a bearer credential with every request.
    pub fn new(timeout: Duration, auth_token: Option<String>) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(HttpTransport { client, auth_token })
    }
}

impl Transport for HttpTransport {
    fn put(
        &self,
        request: PushRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<PushResponse>> + Send + '_>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .put(&request.endpoint)
                .header(DEVICE_ID_HEADER, &request.device_id)
                .json(&request.body);
            if let Some(token) = &self.auth_token {
                builder = builder.bearer_auth(token);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::ConnectionFailed(e.to_string())
                }
            })?;

            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;

            let body = if text.trim().is_empty() {
                None
            } else {
                match SyncResponse::from_json(&text) {
                    Ok(body) => Some(body),
                    Err(e) => {
                        tracing::debug!(status, error = %e, "response body is not a sync response");
                        None
                    }
                }
            };
            Ok(PushResponse { status, body })
        })
    }
}
