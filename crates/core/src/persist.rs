// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage of store payloads.
//!
//! Only the domain payload is persisted. Sync metadata (status, last sync
//! time, pending count) is never written and always resets on reload.
//!
//! [`JsonFileStore`] keeps one pretty-printed JSON file per key and replaces
//! it atomically: the new content is written to a temporary file, fsynced,
//! then renamed over the old one.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::Payload;

/// Key-value persistence collaborator injected into a store.
pub trait Persistence: Send + Sync {
    /// Loads the value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &Value) -> Result<()>;

    /// Removes the value stored under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Loads and decodes a payload stored under `key`.
pub fn load_payload<T: Payload>(store: &dyn Persistence, key: &str) -> Result<Option<T>> {
    match store.load(key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Encodes and stores a payload under `key`.
pub fn save_payload<T: Payload>(store: &dyn Persistence, key: &str, payload: &T) -> Result<()> {
    store.save(key, &serde_json::to_value(payload)?)
}

fn validate_key(key: &str) -> Result<()> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0']);
    if invalid {
        return Err(Error::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// File-backed persistence, one `<key>.json` per key in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(JsonFileStore { dir: dir.to_path_buf() })
    }

    /// Returns the directory holding the payload files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Persistence for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_str(&content).map_err(|e| {
            Error::CorruptedData(format!("{}: {}", path.display(), e))
        })?;
        Ok(Some(value))
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));

        let mut file = File::create(&tmp_path)?;
        let json = serde_json::to_string_pretty(value)?;
        writeln!(file, "{}", json)?;
        file.sync_all()?;
        fs::rename(&tmp_path, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory persistence for tests and ephemeral stores.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Persistence for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        Ok(self.entries.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned())
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        validate_key(key)?;
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
