// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "storesync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Keep local store state in sync with a remote endpoint")]
#[command(
    long_about = "Keep local store state in sync with a remote endpoint.\n\n\
    Stores are cached locally, pushed with retry and backoff, and reconciled \
    with the server's copy using a per-store conflict strategy."
)]
pub struct Cli {
    /// Run as if storesync was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<PathBuf>,

    /// Emit debug logs on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize storesync in the current directory
    #[command(after_help = "\
Examples:
  storesync init                                    Create .storesync/ with a sample store
  storesync init --endpoint https://api/sync/favs   Point the sample store at an endpoint
  storesync init --path ../app                      Initialize another directory")]
    Init {
        /// Directory to initialize (defaults to the current directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Endpoint of the sample 'favorites' store
        #[arg(long, value_parser = non_empty_string)]
        endpoint: Option<String>,
    },

    /// Push a store to its endpoint and wait for the outcome
    #[command(after_help = "\
Examples:
  storesync push favorites                        Push the cached payload
  storesync push favorites --file favs.json       Replace the payload, then push
  storesync push favorites --wait 60              Allow up to 60s for retries")]
    Push {
        /// Store name
        #[arg(value_parser = non_empty_string)]
        store: String,

        /// JSON file whose object replaces the cached payload before pushing
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        /// Seconds to wait for retries to settle
        #[arg(long, short = 'w', default_value_t = 30)]
        wait: u64,
    },

    /// Replace the cached payload with data fetched from the backend
    #[command(after_help = "\
Examples:
  storesync load favorites --file server.json     Hydrate the cache without pushing")]
    Load {
        /// Store name
        #[arg(value_parser = non_empty_string)]
        store: String,

        /// JSON file holding the backend's payload
        #[arg(long, short = 'f')]
        file: PathBuf,
    },

    /// Show a store's cached payload
    #[command(after_help = "\
Examples:
  storesync show favorites                        Settings and payload
  storesync show favorites -o json                Payload only, as JSON")]
    Show {
        /// Store name
        #[arg(value_parser = non_empty_string)]
        store: String,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Print this device's identifier, creating it if needed
    Device,
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
