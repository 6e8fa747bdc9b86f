// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use crate::config::{init_work_dir, DEFAULT_ENDPOINT, SAMPLE_STORE};
use crate::error::Result;

pub fn run(path: Option<PathBuf>, endpoint: Option<String>) -> Result<()> {
    let target_path = match path {
        Some(p) => p,
        None => std::env::current_dir()?,
    };

    let work_dir = init_work_dir(&target_path, endpoint.as_deref())?;

    println!("Initialized storesync at {}", work_dir.display());
    println!(
        "Store '{}' syncs to {}",
        SAMPLE_STORE,
        endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    );
    Ok(())
}
