// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ss-core: Shared primitives for the storesync engine
//!
//! This crate provides the runtime-free building blocks used by the async
//! sync engine: store state and status, sync actions and their ids, retry
//! backoff, conflict resolution, configuration, and the persistence and
//! device identity collaborators.

pub mod action;
pub mod backoff;
pub mod config;
pub mod conflict;
pub mod error;
pub mod identity;
pub mod persist;
pub mod protocol;
pub mod status;

pub use action::{ActionId, ActionIdGen, ClockSource, QueueItem, SyncAction, SystemClock};
pub use backoff::{backoff_delay, Backoff, MAX_BACKOFF};
pub use config::SyncConfig;
pub use conflict::{resolve, ConflictStrategy, CustomResolver};
pub use error::{Error, Result};
pub use identity::{DeviceIdentityProvider, FileDeviceIdentity, StaticDeviceIdentity};
pub use persist::{JsonFileStore, MemoryStore, Persistence};
pub use protocol::SyncResponse;
pub use status::{SyncStatus, SyncableState};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Domain payload carried by a store.
///
/// Each store picks its own concrete schema; the engine only needs to clone
/// it, move it across tasks, and convert it to and from JSON.
pub trait Payload: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Payload for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}
