//! Retry decisions

use super::backoff::ExponentialBackoff;
use super::config::RetryConfig;
use crate::error::ErrorKind;
use crate::invoker::InvokeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of consulting the policy after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try the same target again after `delay`
    Retry { delay: Duration },
    /// Stop trying this target
    GiveUp(GiveUpReason),
}

impl RetryDecision {
    pub fn is_retry(&self) -> bool {
        matches!(self, Self::Retry { .. })
    }
}

/// Why a target was given up on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiveUpReason {
    /// The failure kind is not worth repeating
    NonRetryable,
    /// `max_attempts` invocations were made
    AttemptsExhausted,
    /// The per-target time budget ran out
    ElapsedExhausted,
    /// The rate guard refused a retry
    AdmissionRejected,
}

impl std::fmt::Display for GiveUpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NonRetryable => "non-retryable error",
            Self::AttemptsExhausted => "attempts exhausted",
            Self::ElapsedExhausted => "time budget exhausted",
            Self::AdmissionRejected => "retry not admitted",
        };
        f.write_str(text)
    }
}

/// Stateless retry policy; one instance is shared by every call
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    backoff: ExponentialBackoff,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        let backoff = config.backoff();
        Self { config, backoff }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Decide what to do after attempt `attempt` (1-based) failed with `kind`
    ///
    /// `elapsed` is the time spent on the current target so far.
    pub fn should_retry(&self, kind: ErrorKind, attempt: u32, elapsed: Duration) -> RetryDecision {
        if !kind.is_retryable() {
            return RetryDecision::GiveUp(GiveUpReason::NonRetryable);
        }
        if attempt >= self.config.max_attempts {
            return RetryDecision::GiveUp(GiveUpReason::AttemptsExhausted);
        }
        if elapsed >= self.config.max_elapsed {
            return RetryDecision::GiveUp(GiveUpReason::ElapsedExhausted);
        }

        RetryDecision::Retry {
            delay: self.backoff.delay_for_attempt(attempt),
        }
    }

    /// Like [`should_retry`](Self::should_retry), honouring a provider retry-after hint
    ///
    /// The hint replaces the computed delay and is still bounded by the cap.
    pub fn decide(&self, error: &InvokeError, attempt: u32, elapsed: Duration) -> RetryDecision {
        match self.should_retry(error.kind, attempt, elapsed) {
            RetryDecision::Retry { delay } => RetryDecision::Retry {
                delay: error
                    .retry_after
                    .map_or(delay, |hint| hint.min(self.backoff.cap())),
            },
            give_up => give_up,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
