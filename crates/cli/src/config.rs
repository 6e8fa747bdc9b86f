// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.storesync/config.toml` and includes:
//! - `auth_token`: Optional bearer credential sent with every push
//! - `device_id_path`: Optional location of the device identifier file
//! - `debug`: Per-operation debug events for every store
//! - `[stores.<name>]`: One table per synchronized store
//!
//! Store payloads are cached in `.storesync/data/<name>.json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ss_core::config::{
    DEFAULT_BASE_DELAY, DEFAULT_DEBOUNCE, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT,
};
use ss_core::{ConflictStrategy, FileDeviceIdentity, SyncConfig};

use crate::env;
use crate::error::{Error, Result};

const WORK_DIR_NAME: &str = ".storesync";
const CONFIG_FILE_NAME: &str = "config.toml";
const DATA_DIR_NAME: &str = "data";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Store created by `storesync init`.
pub const SAMPLE_STORE: &str = "favorites";
/// Endpoint of the sample store when none is given.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/sync/favorites";

/// Project configuration stored in `.storesync/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Bearer token for the sync endpoints. `STORESYNC_AUTH_TOKEN` overrides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Device identifier file (relative to project root or absolute).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id_path: Option<String>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub stores: BTreeMap<String, StoreSettings>,
}

/// Settings of one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub endpoint: String,
    #[serde(default)]
    pub strategy: ConflictStrategy,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY.as_millis() as u64
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

impl StoreSettings {
    /// Creates settings with default retry, debounce and timeout values.
    pub fn new(endpoint: impl Into<String>) -> Self {
        StoreSettings {
            endpoint: endpoint.into(),
            strategy: ConflictStrategy::default(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            debounce_ms: default_debounce_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    /// Builds the engine config for this store.
    ///
    /// The `custom` strategy needs a resolver function and cannot be
    /// selected from a config file.
    pub fn to_sync_config<T>(&self, name: &str, initial: T, debug: bool) -> Result<SyncConfig<T>> {
        if self.strategy == ConflictStrategy::Custom {
            return Err(Error::Config(format!(
                "store '{name}': the custom strategy needs a resolver and cannot be set in config.toml"
            )));
        }
        Ok(SyncConfig::new(name, self.endpoint.as_str(), initial)
            .with_strategy(self.strategy)
            .with_max_retries(self.max_retries)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_debounce(Duration::from_millis(self.debounce_ms))
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms))
            .with_debug(debug))
    }
}

impl Config {
    /// Creates the configuration written by `storesync init`.
    pub fn sample(endpoint: &str) -> Self {
        let mut stores = BTreeMap::new();
        stores.insert(SAMPLE_STORE.to_string(), StoreSettings::new(endpoint));
        Config { stores, ..Config::default() }
    }

    /// Loads configuration from the given `.storesync/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to the given `.storesync/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Looks up a store's settings by name.
    pub fn store(&self, name: &str) -> Result<&StoreSettings> {
        self.stores.get(name).ok_or_else(|| Error::UnknownStore {
            name: name.to_string(),
            available: if self.stores.is_empty() {
                "(none)".to_string()
            } else {
                self.stores.keys().cloned().collect::<Vec<_>>().join(", ")
            },
        })
    }

    /// Returns the bearer token, preferring `STORESYNC_AUTH_TOKEN`.
    pub fn auth_token(&self) -> Option<String> {
        env::auth_token().or_else(|| self.auth_token.clone())
    }

    /// Returns the device identity source for this project.
    pub fn device_identity(&self, work_dir: &Path) -> FileDeviceIdentity {
        match &self.device_id_path {
            Some(path) => FileDeviceIdentity::new(resolve_project_path(work_dir, path)),
            None => FileDeviceIdentity::default_location(),
        }
    }
}

/// Resolves a config path against the project root (the parent of `.storesync/`).
fn resolve_project_path(work_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        work_dir.parent().unwrap_or(work_dir).join(path)
    }
}

/// Find the .storesync directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    find_work_dir_from(&std::env::current_dir()?)
}

/// Find the .storesync directory by walking up from `start`
pub fn find_work_dir_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Directory holding cached store payloads.
pub fn data_dir(work_dir: &Path) -> PathBuf {
    work_dir.join(DATA_DIR_NAME)
}

/// Initialize a new .storesync directory at the given path
pub fn init_work_dir(path: &Path, endpoint: Option<&str>) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    fs::create_dir_all(data_dir(&work_dir))?;

    let config = Config::sample(endpoint.unwrap_or(DEFAULT_ENDPOINT));
    config.save(&work_dir)?;
    write_gitignore(&work_dir)?;

    Ok(work_dir)
}

/// Write a .gitignore file to the work directory.
///
/// Cached payloads are machine-local and never committed.
pub fn write_gitignore(work_dir: &Path) -> Result<()> {
    let gitignore_path = work_dir.join(GITIGNORE_FILE_NAME);
    fs::write(&gitignore_path, "# Cached store payloads\ndata/\n")?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
