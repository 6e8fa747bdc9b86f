// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Store synchronization engine.
//!
//! Takes locally, optimistically mutated store state and reconciles it with
//! a remote endpoint under debouncing, retry with backoff, and conflict
//! resolution.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Store    │────►│  Transport  │────►│   Remote    │
//! │ (SyncStore) │◄────│   (trait)   │◄────│  Endpoint   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!     │     ▲
//!     ▼     │ executor
//! ┌─────────────┐
//! │    Queue    │  (failed pushes, retried with backoff)
//! │(RetryQueue) │
//! └─────────────┘
//! ```
//!
//! # Features
//!
//! - Debounced pushes; the payload is read when the timer fires
//! - At most one remote write in flight per store
//! - 401 marks the store offline without retrying
//! - Other failures are retried with exponential backoff and jitter
//! - Server-reported conflicts are resolved with the store's strategy
//! - Injectable transport and retry executor for testing

mod error;
mod queue;
mod store;
mod transport;

pub use error::{SyncError, SyncResult};
pub use queue::{Executor, FailureHook, RetryQueue, RetrySettings};
pub use store::SyncStore;
pub use transport::{
    HttpTransport, PushRequest, PushResponse, Transport, TransportError, TransportResult,
    DEVICE_ID_HEADER,
};

#[cfg(test)]
pub(crate) mod test_helpers;
