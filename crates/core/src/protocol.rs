// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format of the remote sync endpoint.
//!
//! The client PUTs the bare payload as JSON and the endpoint answers with:
//!
//! ```json
//! { "success": true, "data": { ... }, "error": null, "conflictResolved": false }
//! ```
//!
//! `data` carries the server's copy when `conflictResolved` is set.

use serde::{Deserialize, Serialize};

/// Response body of the sync endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct SyncResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Server-reported divergence between its state and what the client sent.
    #[serde(default)]
    pub conflict_resolved: bool,
}

impl<T> SyncResponse<T> {
    /// Creates a plain success response.
    pub fn ok() -> Self {
        SyncResponse { success: true, data: None, error: None, conflict_resolved: false }
    }

    /// Creates a success response carrying the server's payload.
    pub fn with_data(data: T) -> Self {
        SyncResponse { data: Some(data), ..Self::ok() }
    }

    /// Creates a success response flagging a conflict with the server's payload.
    pub fn conflict(data: T) -> Self {
        SyncResponse { success: true, data: Some(data), error: None, conflict_resolved: true }
    }

    /// Creates a failure response.
    pub fn failure(error: impl Into<String>) -> Self {
        SyncResponse { success: false, data: None, error: Some(error.into()), conflict_resolved: false }
    }

    /// Returns the server payload if this response reports a conflict.
    pub fn conflict_data(&self) -> Option<&T> {
        if self.success && self.conflict_resolved {
            self.data.as_ref()
        } else {
            None
        }
    }
}

impl<T: for<'de> Deserialize<'de>> SyncResponse<T> {
    /// Deserializes the response from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
