// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Store state and sync status.
//!
//! Status transitions:
//!
//! ```text
//! idle ──► syncing ──► synced
//!             │ ▲
//!             │ └───── error   (retry queue re-attempts)
//!             └──────► offline (only a fresh sync re-attempts)
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sync status of a single store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// No sync has been attempted since the store was created.
    #[default]
    Idle,
    /// A remote write is in flight.
    Syncing,
    /// The last remote write succeeded.
    Synced,
    /// The last remote write failed with a transient error.
    Error,
    /// The remote rejected the client as unauthenticated.
    Offline,
}

impl SyncStatus {
    /// Returns the lowercase name used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
            SyncStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A store's domain payload together with its sync metadata.
///
/// Only `data` is ever persisted; the metadata always starts from its
/// initial values when a store is restored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncableState<T> {
    /// The domain payload.
    pub data: T,
    /// Current sync status.
    pub status: SyncStatus,
    /// When the store last synced successfully.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Failed pushes handed to the retry queue since the last success.
    pub pending_action_count: u32,
}

impl<T> SyncableState<T> {
    /// Creates a fresh state around a payload, with metadata reset.
    pub fn restore(data: T) -> Self {
        SyncableState {
            data,
            status: SyncStatus::Idle,
            last_synced_at: None,
            pending_action_count: 0,
        }
    }

    /// Returns the part of the state that is written to persistence.
    pub fn partialize(&self) -> &T {
        &self.data
    }

    /// Marks a successful sync at the given time.
    pub fn mark_synced(&mut self, at: DateTime<Utc>) {
        self.status = SyncStatus::Synced;
        self.last_synced_at = Some(at);
        self.pending_action_count = 0;
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
