//! Default values for invocation and retry settings
//!
//! All values can be overridden per target or in the `[retry]` section.

use std::time::Duration;

/// Sampling temperature used when neither the target nor the request sets one
pub const TEMPERATURE: f32 = 0.7;

/// Maximum generated tokens used when neither the target nor the request sets one
pub const MAX_TOKENS: u32 = 1000;

/// Per-invocation timeout (60 seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// AWS region for native Bedrock targets when neither the target nor `AWS_REGION` sets one
pub const BEDROCK_REGION: &str = "us-east-1";

/// Length of the admission window for `rpm` limits
pub const RATE_WINDOW_SECS: u64 = 60;

/// Retry defaults
pub mod retry {
    use super::*;

    /// First backoff delay (1 second)
    pub const BASE_DELAY_MS: u64 = 1_000;

    /// Backoff cap (30 seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Invocations per target before advancing
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Time budget per target (2 minutes)
    pub const MAX_ELAPSED_SECS: u64 = 120;

    pub fn base_delay() -> Duration {
        Duration::from_millis(BASE_DELAY_MS)
    }

    pub fn max_delay() -> Duration {
        Duration::from_secs(MAX_DELAY_SECS)
    }

    pub fn max_elapsed() -> Duration {
        Duration::from_secs(MAX_ELAPSED_SECS)
    }
}

/// Get the default request timeout as Duration
pub fn request_timeout() -> Duration {
    Duration::from_secs(REQUEST_TIMEOUT_SECS)
}

/// Get the default admission window as Duration
pub fn rate_window() -> Duration {
    Duration::from_secs(RATE_WINDOW_SECS)
}
