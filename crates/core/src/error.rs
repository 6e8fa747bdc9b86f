// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ss-core operations.

use thiserror::Error;

/// All possible errors that can occur in ss-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid sync config: {0}")]
    InvalidConfig(String),

    #[error("invalid storage key: '{0}'\n  hint: keys must be non-empty and may not contain path separators")]
    InvalidKey(String),

    #[error("unknown conflict strategy: '{0}'\n  hint: valid strategies are: last-write-wins, merge-union, client-wins, server-wins, custom")]
    UnknownStrategy(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for ss-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
