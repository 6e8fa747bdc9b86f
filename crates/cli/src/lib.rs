// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! storesync - keeps client-side state in sync with a backend.
//!
//! This crate provides the sync engine behind the `storesync` CLI: stores
//! that persist locally, push debounced snapshots over HTTP, retry failed
//! pushes with exponential backoff and reconcile server conflicts.
//!
//! # Main Components
//!
//! - [`SyncStore`](sync::SyncStore) - A synchronized store and its lifecycle
//! - [`RetryQueue`](sync::RetryQueue) - FIFO retries with backoff
//! - [`Config`] - Project configuration (stores, endpoints, credentials)
//! - [`Error`] - Error types for all commands
//!
//! # Embedding
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ss_core::{FileDeviceIdentity, JsonFileStore, SyncConfig};
//! use storesync::sync::SyncStore;
//!
//! let config = SyncConfig::new("favorites", "https://api.example.com/sync", initial);
//! let persistence = Arc::new(JsonFileStore::open(&data_dir)?);
//! let store = SyncStore::new(config, None, persistence, &FileDeviceIdentity::default_location())?;
//!
//! store.mutate(|favs| favs.push("USD".into()));
//! ```

mod cli;
mod commands;
mod env;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat};
pub use config::{find_work_dir, init_work_dir, Config, StoreSettings};
pub use error::{Error, Result};

/// Installs the stderr log subscriber.
///
/// `STORESYNC_LOG` (or `RUST_LOG`) wins over the verbosity flag.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let directive = log_directive(verbose, env::log_filter());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn log_directive(verbose: bool, from_env: Option<String>) -> String {
    match from_env {
        Some(directive) => directive,
        None if verbose => "debug".to_string(),
        None => "warn".to_string(),
    }
}

/// Runs a parsed command.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { path, endpoint } => commands::init::run(path, endpoint),
        Command::Push { store, file, wait } => commands::push::run(&store, file.as_deref(), wait),
        Command::Load { store, file } => commands::load::run(&store, &file),
        Command::Show { store, output } => commands::show::run(&store, output),
        Command::Device => commands::device::run(),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
