// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tempfile::TempDir;
use yare::parameterized;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Alerts {
    alerts: Vec<String>,
}

#[test]
fn file_store_missing_key_is_none() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::open(temp.path()).unwrap();
    assert_eq!(store.load("favorites").unwrap(), None);
}

#[test]
fn file_store_save_then_load() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::open(temp.path()).unwrap();

    let value = json!({"favorites": ["USD", "EUR"]});
    store.save("favorites", &value).unwrap();

    assert_eq!(store.load("favorites").unwrap(), Some(value));
    assert!(temp.path().join("favorites.json").exists());
    assert!(!temp.path().join(".favorites.json.tmp").exists());
}

#[test]
fn file_store_overwrites() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::open(temp.path()).unwrap();

    store.save("prefs", &json!({"theme": "dark"})).unwrap();
    store.save("prefs", &json!({"theme": "light"})).unwrap();

    assert_eq!(store.load("prefs").unwrap(), Some(json!({"theme": "light"})));
}

#[test]
fn file_store_remove_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::open(temp.path()).unwrap();

    store.save("prefs", &json!(1)).unwrap();
    store.remove("prefs").unwrap();
    store.remove("prefs").unwrap();
    assert_eq!(store.load("prefs").unwrap(), None);
}

#[test]
fn file_store_creates_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("a").join("b");
    let store = JsonFileStore::open(&dir).unwrap();
    assert!(dir.is_dir());
    assert_eq!(store.dir(), dir.as_path());
}

#[test]
fn file_store_reports_corrupted_file() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::open(temp.path()).unwrap();
    fs::write(temp.path().join("favorites.json"), "{not json").unwrap();

    assert!(matches!(store.load("favorites"), Err(Error::CorruptedData(_))));
}

#[parameterized(
    empty = { "" },
    dot = { "." },
    dotdot = { ".." },
    slash = { "a/b" },
    backslash = { "a\\b" },
)]
fn invalid_keys_rejected(key: &str) {
    let temp = TempDir::new().unwrap();
    let file_store = JsonFileStore::open(temp.path()).unwrap();
    let memory_store = MemoryStore::new();

    assert!(matches!(file_store.save(key, &json!(1)), Err(Error::InvalidKey(_))));
    assert!(matches!(memory_store.save(key, &json!(1)), Err(Error::InvalidKey(_))));
}

#[test]
fn memory_store_roundtrip() {
    let store = MemoryStore::new();
    assert!(store.is_empty());

    store.save("alerts", &json!({"alerts": []})).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.load("alerts").unwrap(), Some(json!({"alerts": []})));

    store.remove("alerts").unwrap();
    assert!(store.is_empty());
}

#[test]
fn typed_payload_helpers() {
    let store = MemoryStore::new();
    let alerts = Alerts { alerts: vec!["BTC > 50000".to_string()] };

    assert_eq!(load_payload::<Alerts>(&store, "alerts").unwrap(), None);
    save_payload(&store, "alerts", &alerts).unwrap();
    assert_eq!(load_payload::<Alerts>(&store, "alerts").unwrap(), Some(alerts));
}

#[test]
fn typed_load_rejects_wrong_shape() {
    let store = MemoryStore::new();
    store.save("alerts", &json!({"alerts": 3})).unwrap();

    assert!(matches!(load_payload::<Alerts>(&store, "alerts"), Err(Error::Json(_))));
}
