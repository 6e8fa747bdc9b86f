// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry delay calculation.
//!
//! `delay = min(base * 2^attempt + jitter, 30s)` where the jitter is a
//! symmetric ±10% of the unjittered exponential value.

use std::time::Duration;

use rand::Rng;

/// Upper bound on any computed retry delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Largest exponent applied before the cap makes further doubling moot.
const MAX_EXPONENT: u32 = 62;

/// Exponential backoff with jitter, capped at [`MAX_BACKOFF`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
}

impl Backoff {
    /// Creates a backoff with the given base delay and the default cap.
    pub fn new(base: Duration) -> Self {
        Backoff { base, cap: MAX_BACKOFF }
    }

    /// Returns the base delay.
    pub fn base(&self) -> Duration {
        self.base
    }

    /// Computes the delay before retry number `attempt` (0-based).
    ///
    /// Attempts are unsigned, so a negative attempt cannot be expressed.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.delay_with(attempt, rand::rng().random::<f64>())
    }

    /// Computes the delay using `sample` (in `[0, 1]`) as the jitter source.
    pub fn delay_with(&self, attempt: u32, sample: f64) -> Duration {
        let exponential = self.unjittered_ms(attempt);
        let jitter = exponential * 0.2 * (sample.clamp(0.0, 1.0) - 0.5);
        let capped = (exponential + jitter).min(self.cap.as_secs_f64() * 1000.0).max(0.0);
        Duration::from_secs_f64(capped / 1000.0)
    }

    /// The exponential delay in milliseconds before jitter and cap.
    pub fn unjittered_ms(&self, attempt: u32) -> f64 {
        let base_ms = self.base.as_secs_f64() * 1000.0;
        base_ms * 2f64.powi(attempt.min(MAX_EXPONENT) as i32)
    }
}

/// Computes the retry delay for `attempt` from `base` with random jitter.
pub fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    Backoff::new(base).delay(attempt)
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
