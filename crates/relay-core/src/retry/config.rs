//! Retry configuration

use super::backoff::ExponentialBackoff;
use crate::config::defaults;
use crate::error::{RelayError, RelayResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry settings shared by every target of a router
///
/// # Example
/// ```
/// use relay_core::retry::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default()
///     .with_max_attempts(5)
///     .with_base_delay(Duration::from_millis(200))
///     .with_max_delay(Duration::from_secs(10));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay after the first failed attempt
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    /// Upper bound for any single delay
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    /// Invocations per target, the first one included
    pub max_attempts: u32,
    /// Time budget per target
    #[serde(with = "humantime_serde")]
    pub max_elapsed: Duration,
    /// Randomize delays uniformly below the computed value
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay: defaults::retry::base_delay(),
            max_delay: defaults::retry::max_delay(),
            max_attempts: defaults::retry::MAX_ATTEMPTS,
            max_elapsed: defaults::retry::max_elapsed(),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config that tries every target exactly once
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    pub fn with_max_elapsed(mut self, budget: Duration) -> Self {
        self.max_elapsed = budget;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Backoff schedule described by this config
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.base_delay, self.max_delay, self.jitter)
    }

    pub fn validate(&self) -> RelayResult<()> {
        if self.max_attempts == 0 {
            return Err(RelayError::config_with_context(
                "max_attempts must be at least 1",
                "retry.max_attempts",
            ));
        }
        if self.base_delay.is_zero() || self.max_delay.is_zero() {
            return Err(RelayError::config_with_context(
                "Retry delays must be non-zero",
                "retry",
            ));
        }
        if self.base_delay > self.max_delay {
            return Err(RelayError::config_with_context(
                format!(
                    "base_delay ({:?}) exceeds max_delay ({:?})",
                    self.base_delay, self.max_delay
                ),
                "retry.base_delay",
            ));
        }
        if self.max_elapsed.is_zero() {
            return Err(RelayError::config_with_context(
                "max_elapsed must be non-zero",
                "retry.max_elapsed",
            ));
        }
        Ok(())
    }
}
