// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Device identity for sync requests.
//!
//! The device id is contextual metadata only: it is sent along with pushes
//! and attached to log events, and never takes part in conflict resolution.

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "storesync";
const DEVICE_ID_FILE_NAME: &str = "device-id";

/// Source of a durable, process-independent device identifier.
pub trait DeviceIdentityProvider: Send + Sync {
    /// Returns the device id, generating it on first use if needed.
    fn device_id(&self) -> Result<String>;
}

/// A fixed device id, for tests and embedders that manage ids themselves.
#[derive(Debug, Clone)]
pub struct StaticDeviceIdentity(String);

impl StaticDeviceIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        StaticDeviceIdentity(id.into())
    }
}

impl DeviceIdentityProvider for StaticDeviceIdentity {
    fn device_id(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Device id stored in a file, generated once and reused across runs.
#[derive(Debug)]
pub struct FileDeviceIdentity {
    path: PathBuf,
    cached: OnceLock<String>,
}

impl FileDeviceIdentity {
    /// Uses the id file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileDeviceIdentity { path: path.into(), cached: OnceLock::new() }
    }

    /// Uses the id file in the platform's local data directory.
    pub fn default_location() -> Self {
        Self::new(default_device_id_path())
    }

    /// Returns the path of the id file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_or_create(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let id = content.trim();
                if id.is_empty() {
                    return Err(Error::CorruptedData(format!(
                        "device id file {} is empty",
                        self.path.display()
                    )));
                }
                Ok(id.to_string())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let id = generate_device_id();
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut file = fs::File::create(&self.path)?;
                writeln!(file, "{id}")?;
                file.sync_all()?;
                Ok(id)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl DeviceIdentityProvider for FileDeviceIdentity {
    fn device_id(&self) -> Result<String> {
        if let Some(id) = self.cached.get() {
            return Ok(id.clone());
        }
        let id = self.load_or_create()?;
        Ok(self.cached.get_or_init(|| id).clone())
    }
}

/// Generates a fresh random device id.
pub fn generate_device_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Returns the default location of the device id file.
///
/// Resolution order:
/// 1. `$STORESYNC_DEVICE_ID_FILE`
/// 2. `<local data dir>/storesync/device-id`
/// 3. `.storesync-device-id` in the current directory
pub fn default_device_id_path() -> PathBuf {
    if let Some(path) = std::env::var_os("STORESYNC_DEVICE_ID_FILE").filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(DEVICE_ID_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(".storesync-device-id"))
}
