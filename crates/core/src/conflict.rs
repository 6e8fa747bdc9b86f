// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Conflict resolution between a locally sent payload and the server's copy.
//!
//! Strategies:
//! - `client-wins`: keep the local payload
//! - `server-wins`: take the remote payload
//! - `last-write-wins`: take the remote payload (no timestamps are compared;
//!   the name is historical and the behaviour matches `server-wins`)
//! - `merge-union`: remote keys win, except sequences present on both sides,
//!   which become a deduplicated union (remote entries first, then local
//!   entries not already present). Keys only present locally are dropped.
//! - `custom`: delegate to a caller-supplied resolver

use std::collections::HashSet;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::Payload;

/// Caller-supplied resolver used by [`ConflictStrategy::Custom`].
///
/// Called as `resolver(local, remote)`.
pub type CustomResolver<T> = Arc<dyn Fn(&T, &T) -> T + Send + Sync>;

/// How a store reconciles its payload with the server's on conflict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum ConflictStrategy {
    #[default]
    LastWriteWins,
    MergeUnion,
    ClientWins,
    ServerWins,
    Custom,
}

impl ConflictStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStrategy::LastWriteWins => "last-write-wins",
            ConflictStrategy::MergeUnion => "merge-union",
            ConflictStrategy::ClientWins => "client-wins",
            ConflictStrategy::ServerWins => "server-wins",
            ConflictStrategy::Custom => "custom",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last-write-wins" => Ok(ConflictStrategy::LastWriteWins),
            "merge-union" => Ok(ConflictStrategy::MergeUnion),
            "client-wins" => Ok(ConflictStrategy::ClientWins),
            "server-wins" => Ok(ConflictStrategy::ServerWins),
            "custom" => Ok(ConflictStrategy::Custom),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

impl TryFrom<String> for ConflictStrategy {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Resolves `local` against `remote` using `strategy`.
///
/// Always yields a payload. A missing custom resolver, or a merged value that
/// no longer fits `T`, falls back to the remote payload. So does a panicking
/// resolver in builds that unwind on panic.
pub fn resolve<T: Payload>(
    local: &T,
    remote: &T,
    strategy: ConflictStrategy,
    custom: Option<&CustomResolver<T>>,
) -> T {
    match strategy {
        ConflictStrategy::ClientWins => local.clone(),
        ConflictStrategy::ServerWins | ConflictStrategy::LastWriteWins => remote.clone(),
        ConflictStrategy::MergeUnion => merge_union(local, remote),
        ConflictStrategy::Custom => match custom {
            // Unwinding only happens under `panic = "unwind"`; the workspace
            // release profile aborts, so there a resolver panic ends the process.
            Some(resolver) => match catch_unwind(AssertUnwindSafe(|| resolver(local, remote))) {
                Ok(resolved) => resolved,
                Err(_) => {
                    tracing::error!("custom conflict resolver panicked, keeping server payload");
                    remote.clone()
                }
            },
            None => {
                tracing::warn!("custom strategy without a resolver, keeping server payload");
                remote.clone()
            }
        },
    }
}

fn merge_union<T: Payload>(local: &T, remote: &T) -> T {
    let (local_value, remote_value) = match (serde_json::to_value(local), serde_json::to_value(remote)) {
        (Ok(l), Ok(r)) => (l, r),
        _ => {
            tracing::warn!("payload is not JSON-representable, keeping server payload");
            return remote.clone();
        }
    };

    let merged = match (local_value, remote_value) {
        (Value::Object(local_map), Value::Object(remote_map)) => {
            Value::Object(merge_maps(&local_map, remote_map))
        }
        // Non-map payloads have no keys to merge; the remote value wins.
        _ => return remote.clone(),
    };

    match serde_json::from_value(merged) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::warn!(error = %e, "merged payload does not fit the store schema, keeping server payload");
            remote.clone()
        }
    }
}

fn merge_maps(local: &Map<String, Value>, remote: Map<String, Value>) -> Map<String, Value> {
    remote
        .into_iter()
        .map(|(key, remote_value)| {
            let merged = match (local.get(&key), remote_value) {
                (Some(Value::Array(local_items)), Value::Array(remote_items)) => {
                    Value::Array(union(remote_items, local_items))
                }
                (_, remote_value) => remote_value,
            };
            (key, merged)
        })
        .collect()
}

/// Remote entries first, then local entries not already present.
fn union(remote: Vec<Value>, local: &[Value]) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(remote.len() + local.len());

    for item in remote.into_iter().chain(local.iter().cloned()) {
        // serde_json maps are ordered, so the rendered form is canonical.
        if seen.insert(item.to_string()) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
