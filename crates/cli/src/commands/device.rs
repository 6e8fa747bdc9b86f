// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ss_core::{DeviceIdentityProvider, FileDeviceIdentity};

use crate::config::{find_work_dir, Config};
use crate::error::{Error, Result};

/// Prints the device identifier, creating it on first use.
///
/// Outside a project the default location is used.
pub fn run() -> Result<()> {
    let identity = match find_work_dir() {
        Ok(work_dir) => Config::load(&work_dir)?.device_identity(&work_dir),
        Err(Error::NotInitialized) => FileDeviceIdentity::default_location(),
        Err(e) => return Err(e),
    };
    println!("{}", identity.device_id()?);
    Ok(())
}
