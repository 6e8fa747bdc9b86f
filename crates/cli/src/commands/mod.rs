// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod device;
pub mod init;
pub mod load;
pub mod push;
pub mod show;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use ss_core::JsonFileStore;

use crate::config::{data_dir, find_work_dir, Config};
use crate::error::{Error, Result};
use crate::sync::SyncStore;

/// Payload of stores managed from the command line: an open JSON object.
pub type Document = serde_json::Map<String, Value>;

/// An initialized project and its configuration.
pub struct Project {
    pub work_dir: PathBuf,
    pub config: Config,
}

impl Project {
    /// Opens the project containing the current directory.
    pub fn open() -> Result<Self> {
        Self::open_at(find_work_dir()?)
    }

    /// Opens the project rooted at the given `.storesync/` directory.
    pub fn open_at(work_dir: PathBuf) -> Result<Self> {
        let config = Config::load(&work_dir)?;
        Ok(Project { work_dir, config })
    }

    /// Payload cache of this project.
    pub fn persistence(&self) -> Result<Arc<JsonFileStore>> {
        Ok(Arc::new(JsonFileStore::open(&data_dir(&self.work_dir))?))
    }

    /// Opens a configured store. Must be called inside a Tokio runtime.
    pub fn open_store(&self, name: &str) -> Result<SyncStore<Document>> {
        let settings = self.config.store(name)?;
        let config = settings.to_sync_config(name, Document::new(), self.config.debug)?;
        let identity = self.config.device_identity(&self.work_dir);
        let store =
            SyncStore::new(config, self.config.auth_token(), self.persistence()?, &identity)?;
        Ok(store)
    }
}

/// Reads a JSON object from `path`.
pub fn read_document(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)?;
    match serde_json::from_str(&content)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidPayload(format!(
            "{} holds a JSON {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Builds the runtime commands use to drive stores.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread().enable_all().build()?)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
