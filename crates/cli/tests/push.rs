// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;
use serde_json::json;

#[test]
fn pushes_payload_file() {
    let server = StubServer::start();
    let temp = init_temp();
    write_config(&temp, &server.url(), 3, "last-write-wins");
    let file = write_json(&temp, "favs.json", r#"{"favorites":["USD","EUR"]}"#);

    storesync(&temp)
        .args(["push", "favorites", "--file", &file, "--wait", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: synced"))
        .stdout(predicate::str::contains("last synced:"));

    assert_eq!(server.bodies(), vec![json!({ "favorites": ["USD", "EUR"] })]);
}

#[test]
fn push_keeps_payload_in_cache() {
    let server = StubServer::start();
    let temp = init_temp();
    write_config(&temp, &server.url(), 3, "last-write-wins");
    let file = write_json(&temp, "favs.json", r#"{"favorites":["CHF"]}"#);

    storesync(&temp).args(["push", "favorites", "-f", &file]).assert().success();

    storesync(&temp)
        .args(["show", "favorites", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CHF"));
}

#[test]
fn unauthorized_reports_offline() {
    let server = StubServer::start();
    server.respond(401, r#"{"success":false,"error":"login required"}"#);
    let temp = init_temp();
    write_config(&temp, &server.url(), 3, "last-write-wins");

    storesync(&temp)
        .args(["push", "favorites"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("status: offline"))
        .stderr(predicate::str::contains("offline"));

    assert_eq!(server.request_count(), 1);
}

#[test]
fn server_errors_are_retried() {
    let server = StubServer::start();
    server.respond(500, r#"{"success":false,"error":"database down"}"#);
    server.respond(503, "");
    let temp = init_temp();
    write_config(&temp, &server.url(), 3, "last-write-wins");

    storesync(&temp)
        .args(["push", "favorites", "--wait", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: synced"));

    assert_eq!(server.request_count(), 3);
}

#[test]
fn unreachable_endpoint_fails_after_retries() {
    let temp = init_temp();
    write_config(&temp, &unreachable_endpoint(), 1, "last-write-wins");

    storesync(&temp)
        .args(["push", "favorites", "--wait", "10"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("status: error"))
        .stdout(predicate::str::contains("pending: 1"))
        .stderr(predicate::str::contains("failed with 1 pending change(s)"));
}

#[test]
fn conflict_is_merged_into_cache() {
    let server = StubServer::start();
    server.respond(200, r#"{"success":true,"conflictResolved":true,"data":{"favorites":["USD","GBP"]}}"#);
    let temp = init_temp();
    write_config(&temp, &server.url(), 3, "merge-union");
    let file = write_json(&temp, "favs.json", r#"{"favorites":["USD","EUR"]}"#);

    storesync(&temp).args(["push", "favorites", "-f", &file]).assert().success();

    let output = storesync(&temp).args(["show", "favorites", "-o", "json"]).output().unwrap();
    let cached: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(cached, json!({ "favorites": ["USD", "GBP", "EUR"] }));
}

#[test]
fn auth_token_from_env_is_accepted() {
    let server = StubServer::start();
    let temp = init_temp();
    write_config(&temp, &server.url(), 0, "last-write-wins");

    storesync(&temp)
        .env("STORESYNC_AUTH_TOKEN", "secret")
        .args(["push", "favorites"])
        .assert()
        .success();
}

#[test]
fn rejects_non_object_payload() {
    let temp = init_temp();
    let file = write_json(&temp, "list.json", "[1, 2, 3]");

    storesync(&temp)
        .args(["push", "favorites", "-f", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("array"));
}

#[test]
fn rejects_custom_strategy_in_config() {
    let temp = init_temp();
    write_config(&temp, "http://127.0.0.1:1/sync", 0, "custom");

    storesync(&temp)
        .args(["push", "favorites"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("custom strategy"));
}
