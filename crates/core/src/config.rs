// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-store sync configuration.
//!
//! A [`SyncConfig`] is fixed when the store is created; nothing about it
//! changes at runtime.

use std::fmt;
use std::time::Duration;

use crate::conflict::{ConflictStrategy, CustomResolver};
use crate::error::{Error, Result};

/// Default number of retries after the first failed push.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay for retry backoff.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
/// Default quiet period before a scheduled sync fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
/// Default bound on a single remote write.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration of one synchronized store.
#[derive(Clone)]
pub struct SyncConfig<T> {
    /// Store name, used as the persistence key and in log events.
    pub name: String,
    /// Remote endpoint the payload is PUT to.
    pub endpoint: String,
    /// Payload used when nothing has been persisted yet.
    pub initial: T,
    pub strategy: ConflictStrategy,
    /// Resolver for [`ConflictStrategy::Custom`].
    pub resolver: Option<CustomResolver<T>>,
    /// Retries after the first failed queue attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub debounce: Duration,
    pub request_timeout: Duration,
    /// Emit per-operation debug events for this store.
    pub debug: bool,
}

impl<T> SyncConfig<T> {
    /// Creates a config with default retry, debounce and timeout settings.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, initial: T) -> Self {
        SyncConfig {
            name: name.into(),
            endpoint: endpoint.into(),
            initial,
            strategy: ConflictStrategy::default(),
            resolver: None,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            debug: false,
        }
    }

    pub fn with_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Installs a custom resolver and switches to [`ConflictStrategy::Custom`].
    pub fn with_resolver(mut self, resolver: CustomResolver<T>) -> Self {
        self.strategy = ConflictStrategy::Custom;
        self.resolver = Some(resolver);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Checks the config for values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfig("store name must not be empty".to_string()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "store '{}' has an empty endpoint",
                self.name
            )));
        }
        if self.strategy == ConflictStrategy::Custom && self.resolver.is_none() {
            return Err(Error::InvalidConfig(format!(
                "store '{}' uses the custom strategy without a resolver",
                self.name
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::InvalidConfig(format!(
                "store '{}' has a zero request timeout",
                self.name
            )));
        }
        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for SyncConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("initial", &self.initial)
            .field("strategy", &self.strategy)
            .field("resolver", &self.resolver.as_ref().map(|_| "<fn>"))
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("debounce", &self.debounce)
            .field("request_timeout", &self.request_timeout)
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
