// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::SyncError;

/// All possible errors that can occur in the storesync CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'storesync init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("unknown store: '{name}'\n  hint: configured stores: {available}")]
    UnknownStore { name: String, available: String },

    #[error("invalid payload: {0}\n  hint: payload files must contain a JSON object")]
    InvalidPayload(String),

    #[error("store '{store}' is offline: the endpoint rejected the credentials\n  hint: set auth_token in .storesync/config.toml or STORESYNC_AUTH_TOKEN")]
    Offline { store: String },

    #[error("sync of '{store}' failed with {pending} pending change(s)")]
    SyncFailed { store: String, pending: u32 },

    #[error("sync of '{store}' did not settle within {secs}s\n  hint: raise --wait or check the endpoint")]
    NotSettled { store: String, secs: u64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(ss_core::Error),

    #[error(transparent)]
    Sync(SyncError),
}

impl From<ss_core::Error> for Error {
    fn from(e: ss_core::Error) -> Self {
        match e {
            ss_core::Error::Io(e) => Error::Io(e),
            ss_core::Error::Json(e) => Error::Json(e),
            ss_core::Error::InvalidConfig(msg) => Error::Config(msg),
            other => Error::Core(other),
        }
    }
}

impl From<SyncError> for Error {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Core(e) => e.into(),
            other => Error::Sync(other),
        }
    }
}

/// Result type alias using the storesync Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
