// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync actions and their identifiers.
//!
//! An action id combines wall clock time with a sequence number so ids are
//! unique per generator and sort in creation order even when several actions
//! are created within the same millisecond or the wall clock steps backwards.
//!
//! Format: `{wall_ms}-{seq}`

use std::cmp::Ordering;
use std::fmt;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag used for actions created by a failed push.
pub const SYNC_ACTION_TYPE: &str = "sync";

/// Identifier of a [`SyncAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId {
    /// Wall clock time in milliseconds since Unix epoch.
    pub wall_ms: u64,
    /// Sequence number among ids issued at the same wall time.
    pub seq: u32,
}

impl ActionId {
    /// Creates an id with the given components.
    pub fn new(wall_ms: u64, seq: u32) -> Self {
        ActionId { wall_ms, seq }
    }
}

impl Ord for ActionId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wall_ms.cmp(&other.wall_ms).then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for ActionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wall_ms, self.seq)
    }
}

/// Trait for getting the current wall clock time.
///
/// This allows injecting a mock clock for testing.
pub trait ClockSource: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using `std::time::SystemTime`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
    }
}

/// Generator of monotonically increasing [`ActionId`]s.
pub struct ActionIdGen<C: ClockSource = SystemClock> {
    clock: C,
    last: Mutex<ActionId>,
}

impl ActionIdGen<SystemClock> {
    /// Creates a generator backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ActionIdGen<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ClockSource> ActionIdGen<C> {
    /// Creates a generator with a custom clock source.
    pub fn with_clock(clock: C) -> Self {
        ActionIdGen { clock, last: Mutex::new(ActionId::new(0, 0)) }
    }

    /// Issues the next id.
    ///
    /// If the wall clock did not advance past the last issued id, the
    /// sequence number is bumped instead.
    pub fn next_id(&self) -> ActionId {
        let physical = self.clock.now_ms();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        let next = if physical > last.wall_ms {
            ActionId::new(physical, 0)
        } else {
            ActionId::new(last.wall_ms, last.seq.saturating_add(1))
        };
        *last = next;
        next
    }
}

/// One intended remote mutation, created when a push fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncAction<T> {
    pub id: ActionId,
    /// Free-form tag describing the mutation (e.g. `"sync"`).
    #[serde(rename = "type")]
    pub action_type: String,
    /// Snapshot of the payload that failed to reach the remote.
    pub payload: T,
    pub timestamp: DateTime<Utc>,
    pub retry_count: u32,
}

impl<T> SyncAction<T> {
    /// Creates a sync action for a failed push of `payload`.
    pub fn sync(id: ActionId, payload: T) -> Self {
        SyncAction {
            id,
            action_type: SYNC_ACTION_TYPE.to_string(),
            payload,
            timestamp: Utc::now(),
            retry_count: 0,
        }
    }

    /// Returns a copy carrying the given retry count.
    pub fn with_retry_count(&self, retry_count: u32) -> Self
    where
        T: Clone,
    {
        SyncAction { retry_count, ..self.clone() }
    }
}

/// A [`SyncAction`] held by the retry queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueItem<T> {
    pub action: SyncAction<T>,
    pub enqueued_at: DateTime<Utc>,
    /// Failed execution attempts so far.
    pub attempts: u32,
}

impl<T> QueueItem<T> {
    /// Wraps an action for queueing.
    pub fn new(action: SyncAction<T>) -> Self {
        QueueItem { action, enqueued_at: Utc::now(), attempts: 0 }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
