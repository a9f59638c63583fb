//! Bounded retry with exponential backoff.
//!
//! One policy type replaces per-call-site retry wrappers: any operation
//! that may fail transiently (downloads, recognition hiccups, recoverable
//! parse glitches) runs through `RetryPolicy::run` with a failure-category
//! predicate deciding what is worth another attempt.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Retry bounds, loadable from configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub min_wait_ms: u64,
    pub max_wait_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_wait_ms: 500,
            max_wait_ms: 10_000,
        }
    }
}

/// Retry policy with exponential backoff and a retryability predicate.
pub struct RetryPolicy {
    max_attempts: u32,
    min_wait: Duration,
    max_wait: Duration,
    retryable: fn(&Error) -> bool,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            min_wait: Duration::from_millis(config.min_wait_ms),
            max_wait: Duration::from_millis(config.max_wait_ms),
            retryable: Error::is_transient,
        }
    }

    /// Override the default transient-failure predicate.
    pub fn with_predicate(mut self, retryable: fn(&Error) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Backoff before attempt `attempt + 1`:
    /// `min(max_wait, min_wait * 2^(attempt-1))`.
    fn wait_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.min_wait.saturating_mul(factor).min(self.max_wait)
    }

    /// Run an operation, retrying retryable failures up to the attempt
    /// bound. The final failure is re-raised to the caller untouched.
    pub fn run<T, F>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && (self.retryable)(&err) => {
                    let wait = self.wait_for(attempt);
                    log::warn!(
                        "retry {}: attempt {}/{} failed, next in {:?}: {}",
                        label,
                        attempt,
                        self.max_attempts,
                        wait,
                        err
                    );
                    std::thread::sleep(wait);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
