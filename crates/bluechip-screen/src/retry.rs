//! Bounded retry with fixed or exponential backoff.
//!
//! A rate-limited symbol is re-evaluated from scratch after a cool-down.
//! [`RetryPolicy`] caps the number of attempts so a provider that never
//! recovers cannot block a run forever.

use bluechip_traits::{BlueChipError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Same cool-down before every retry.
    Fixed {
        /// Cool-down in milliseconds.
        delay_ms: u64,
    },
    /// Cool-down of `base * factor^retry`, capped at `max`.
    Exponential {
        /// Cool-down before the first retry, in milliseconds.
        base_ms: u64,
        /// Multiplicative factor for each further retry.
        factor: f64,
        /// Upper bound for a single cool-down, in milliseconds.
        max_ms: u64,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Fixed { delay_ms: 60_000 }
    }
}

impl Backoff {
    /// Cool-down before retry number `retry` (0-based).
    #[must_use]
    pub fn delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Self::Exponential {
                base_ms,
                factor,
                max_ms,
            } => {
                let scale = factor.powi(retry.min(i32::MAX as u32) as i32);
                let millis = (base_ms as f64 * scale).min(max_ms as f64);
                Duration::from_millis(millis.max(0.0) as u64)
            }
        }
    }
}

/// How often and how patiently a rate-limited symbol is retried.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total evaluation attempts per symbol, including the first (default: 5)
    pub max_attempts: u32,

    /// Cool-down strategy between attempts (default: fixed 60 s)
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    /// A fixed cool-down policy.
    #[must_use]
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed {
                delay_ms: delay.as_millis() as u64,
            },
        }
    }

    /// Whether another attempt is allowed after `attempt` attempts failed.
    #[must_use]
    pub const fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Cool-down to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn cool_down(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt.saturating_sub(1))
    }

    /// Check that at least one attempt is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`BlueChipError::InvalidConfig`] when `max_attempts` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(BlueChipError::InvalidConfig(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
