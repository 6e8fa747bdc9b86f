// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::time::Duration;

use ss_core::{SyncStatus, SyncableState};

use super::{read_document, runtime, Document, Project};
use crate::error::{Error, Result};

pub fn run(store: &str, file: Option<&Path>, wait: u64) -> Result<()> {
    let project = Project::open()?;
    let payload = file.map(read_document).transpose()?;

    let runtime = runtime()?;
    let (state, settled) =
        runtime.block_on(push(&project, store, payload, Duration::from_secs(wait)))?;

    println!("status: {}", state.status);
    if let Some(at) = state.last_synced_at {
        println!("last synced: {}", at.to_rfc3339());
    }
    if state.pending_action_count > 0 {
        println!("pending: {}", state.pending_action_count);
    }
    outcome(store, &state, settled, wait)
}

/// Optionally replaces the payload, pushes it and waits up to `wait` for
/// retries to settle.
pub(crate) async fn push(
    project: &Project,
    name: &str,
    payload: Option<Document>,
    wait: Duration,
) -> Result<(SyncableState<Document>, bool)> {
    let store = project.open_store(name)?;
    if let Some(payload) = payload {
        store.replace(payload);
    }
    store.force_sync().await;
    let settled = store.wait_settled(wait).await;
    tracing::debug!(store = name, settled, status = %store.status(), "push finished");
    Ok((store.snapshot(), settled))
}

/// Maps the final state onto the command's result.
pub(crate) fn outcome(
    store: &str,
    state: &SyncableState<Document>,
    settled: bool,
    wait: u64,
) -> Result<()> {
    match state.status {
        SyncStatus::Synced => Ok(()),
        SyncStatus::Offline => Err(Error::Offline { store: store.to_string() }),
        _ if !settled => Err(Error::NotSettled { store: store.to_string(), secs: wait }),
        SyncStatus::Error => Err(Error::SyncFailed {
            store: store.to_string(),
            pending: state.pending_action_count,
        }),
        SyncStatus::Idle | SyncStatus::Syncing => Ok(()),
    }
}

#[cfg(test)]
#[path = "push_tests.rs"]
mod tests;
