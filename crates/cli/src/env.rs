// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the log filter directive from `STORESYNC_LOG`, falling back to
/// `RUST_LOG`.
pub fn log_filter() -> Option<String> {
    non_empty(vars::STORESYNC_LOG).or_else(|| non_empty(vars::RUST_LOG))
}

/// Returns the value of `STORESYNC_AUTH_TOKEN` if set and non-empty.
pub fn auth_token() -> Option<String> {
    non_empty(vars::STORESYNC_AUTH_TOKEN)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
