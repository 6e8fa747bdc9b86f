// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::tests::temp_project;
use crate::sync::test_helpers::TestHttpServer;
use chrono::Utc;
use serde_json::json;
use ss_core::persist::load_payload;
use ss_core::ConflictStrategy;
use yare::parameterized;

const WAIT: Duration = Duration::from_secs(5);

fn document(value: serde_json::Value) -> Document {
    value.as_object().cloned().unwrap()
}

fn state(status: SyncStatus, pending: u32) -> SyncableState<Document> {
    let mut state = SyncableState::restore(Document::new());
    state.status = status;
    state.pending_action_count = pending;
    if status == SyncStatus::Synced {
        state.last_synced_at = Some(Utc::now());
    }
    state
}

#[parameterized(
    synced = { SyncStatus::Synced, true, "ok" },
    synced_unsettled = { SyncStatus::Synced, false, "ok" },
    offline = { SyncStatus::Offline, true, "offline" },
    offline_unsettled = { SyncStatus::Offline, false, "offline" },
    error = { SyncStatus::Error, true, "failed" },
    error_unsettled = { SyncStatus::Error, false, "did not settle" },
    idle = { SyncStatus::Idle, true, "ok" },
)]
fn test_outcome(status: SyncStatus, settled: bool, expected: &str) {
    let result = outcome("favorites", &state(status, 1), settled, 30);
    match result {
        Ok(()) => assert_eq!(expected, "ok"),
        Err(err) => {
            let message = err.to_string();
            assert!(message.contains(expected), "{message:?} lacks {expected:?}");
            assert!(message.contains("favorites"));
        }
    }
}

#[test]
fn test_outcome_reports_pending_count() {
    let err = outcome("favorites", &state(SyncStatus::Error, 3), true, 30).unwrap_err();
    assert!(matches!(err, Error::SyncFailed { pending: 3, .. }));
}

#[tokio::test]
async fn push_sends_replacement_payload() {
    let server = TestHttpServer::start().await;
    let (_temp, project) = temp_project(&server.url("/api/sync/favorites"));
    let payload = document(json!({ "favorites": ["USD", "EUR"] }));

    let (state, settled) =
        push(&project, "favorites", Some(payload.clone()), WAIT).await.unwrap();

    assert!(settled);
    assert_eq!(state.status, SyncStatus::Synced);
    assert!(state.last_synced_at.is_some());
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].path, "/api/sync/favorites");
    assert_eq!(requests[0].json(), json!({ "favorites": ["USD", "EUR"] }));
}

#[tokio::test]
async fn push_without_payload_sends_cached_data() {
    let server = TestHttpServer::start().await;
    let (_temp, project) = temp_project(&server.url("/sync"));
    let persistence = project.persistence().unwrap();
    ss_core::persist::save_payload(persistence.as_ref(), "favorites", &json!({ "favorites": ["JPY"] }))
        .unwrap();

    let (state, _) = push(&project, "favorites", None, WAIT).await.unwrap();

    assert_eq!(state.status, SyncStatus::Synced);
    assert_eq!(server.requests()[0].json(), json!({ "favorites": ["JPY"] }));
}

#[tokio::test]
async fn push_unauthorized_goes_offline() {
    let server = TestHttpServer::start().await;
    server.respond(401, r#"{"success":false,"error":"login required"}"#);
    let (_temp, project) = temp_project(&server.url("/sync"));

    let (state, settled) = push(&project, "favorites", None, WAIT).await.unwrap();

    assert!(settled);
    assert_eq!(state.status, SyncStatus::Offline);
    assert_eq!(server.request_count(), 1);
    assert!(matches!(outcome("favorites", &state, settled, 5), Err(Error::Offline { .. })));
}

#[tokio::test]
async fn push_exhausts_retries_on_server_errors() {
    let server = TestHttpServer::start().await;
    server.respond(500, r#"{"success":false,"error":"database down"}"#);
    server.respond(500, r#"{"success":false,"error":"database down"}"#);
    let (_temp, mut project) = temp_project(&server.url("/sync"));
    project.config.stores.get_mut("favorites").unwrap().max_retries = 0;

    let (state, settled) = push(&project, "favorites", None, WAIT).await.unwrap();

    assert!(settled);
    assert_eq!(state.status, SyncStatus::Error);
    assert_eq!(state.pending_action_count, 1);
    // initial push plus a single queued execution
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn push_merges_conflict_and_updates_cache() {
    let server = TestHttpServer::start().await;
    server.respond(
        200,
        r#"{"success":true,"conflictResolved":true,"data":{"favorites":["USD","GBP"]}}"#,
    );
    let (_temp, mut project) = temp_project(&server.url("/sync"));
    project.config.stores.get_mut("favorites").unwrap().strategy = ConflictStrategy::MergeUnion;
    let payload = document(json!({ "favorites": ["USD", "EUR"] }));

    let (state, _) = push(&project, "favorites", Some(payload), WAIT).await.unwrap();

    assert_eq!(state.status, SyncStatus::Synced);
    let favorites = state.data.get("favorites").cloned().unwrap();
    assert_eq!(favorites, json!(["USD", "GBP", "EUR"]));

    let persistence = project.persistence().unwrap();
    let cached: Option<Document> = load_payload(persistence.as_ref(), "favorites").unwrap();
    assert_eq!(cached.unwrap().get("favorites"), Some(&json!(["USD", "GBP", "EUR"])));
}
