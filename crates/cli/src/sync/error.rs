// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for sync operations.

use std::time::Duration;

use super::transport::TransportError;

/// Error type for sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The endpoint answered 401.
    #[error("not authenticated")]
    Unauthorized,

    /// The endpoint answered with a non-2xx status other than 401.
    #[error("server returned status {status}: {message}")]
    Http { status: u16, message: String },

    /// The endpoint answered `success: false`.
    #[error("server rejected sync: {0}")]
    Rejected(String),

    /// The response body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The write did not complete within the request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The payload could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store owning a queued action no longer exists.
    #[error("store has been dropped")]
    StoreClosed,

    /// A store was created outside a Tokio runtime.
    #[error("no tokio runtime available: stores must be created inside a runtime")]
    NoRuntime,

    /// Invalid config, identity or persistence failure.
    #[error(transparent)]
    Core(#[from] ss_core::Error),
}

impl SyncError {
    /// Returns true if the failure is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Transport(_)
                | SyncError::Http { .. }
                | SyncError::Rejected(_)
                | SyncError::InvalidResponse(_)
                | SyncError::Timeout(_)
        )
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
