//! Bounded retry with exponential backoff
//!
//! Each pipeline stage retries only its own transient failures, a fixed
//! number of times. The retry loop never crosses stage boundaries.
//!
//! ```rust,ignore
//! use application::retry::{RetryConfig, with_retry};
//!
//! let outcome = with_retry(&RetryConfig::mail_delivery(), || async {
//!     transport.send(&message).await
//! })
//! .await;
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Backoff settings for one retried operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt in milliseconds (default: 500ms)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay in milliseconds (default: 8000ms)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Multiplier applied per attempt (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Random spread applied to each delay, 0.0 to 1.0 (default: 0.1)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_delay() -> u64 {
    500
}

const fn default_max_delay() -> u64 {
    8_000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_jitter_factor() -> f64 {
    0.1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetryConfig {
    /// Model turns: one retry after a timeout or transient failure
    #[must_use]
    pub const fn model_turns() -> Self {
        Self {
            max_attempts: 2,
            initial_delay_ms: 1_000,
            max_delay_ms: 5_000,
            multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }

    /// Mail submission: three attempts in total
    #[must_use]
    pub const fn mail_delivery() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 250,
            max_delay_ms: 2_000,
            multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }

    /// Zero delays, for tests
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: 0,
            max_delay_ms: 0,
            multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay after the given failed attempt (1-based)
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let base = (self.initial_delay_ms as f64) * self.multiplier.powi(exponent);
        let capped = base.min(self.max_delay_ms as f64);

        let spread = capped * self.jitter_factor.clamp(0.0, 1.0);
        let delay = if spread > 0.0 {
            (capped + rand::rng().random_range(-spread..=spread)).max(0.0)
        } else {
            capped
        };

        Duration::from_millis(delay as u64)
    }
}

/// Errors that know whether another attempt could succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Final result of a retried operation plus attempt metadata
#[derive(Debug)]
pub struct RetryResult<T, E> {
    pub result: Result<T, E>,
    /// Attempts made, at least 1
    pub attempts: u32,
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error,
/// or `config.max_attempts` attempts have been made
#[allow(clippy::cast_possible_truncation)]
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let start = Instant::now();
    let max_attempts = config.max_attempts.max(1);
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        let err = match operation().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(attempts, "Operation succeeded after retries");
                }
                return RetryResult {
                    result: Ok(value),
                    attempts,
                    total_duration: start.elapsed(),
                };
            },
            Err(err) => err,
        };

        if !err.is_retryable() {
            debug!(attempts, error = %err, "Operation failed with non-retryable error");
            return RetryResult {
                result: Err(err),
                attempts,
                total_duration: start.elapsed(),
            };
        }

        if attempts >= max_attempts {
            warn!(attempts, error = %err, "Operation failed after final attempt");
            return RetryResult {
                result: Err(err),
                attempts,
                total_duration: start.elapsed(),
            };
        }

        let delay = config.delay_after(attempts);
        warn!(
            attempt = attempts,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Operation failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
