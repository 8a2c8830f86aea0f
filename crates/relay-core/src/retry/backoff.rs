//! Exponential backoff with full jitter

use rand::Rng;
use std::time::Duration;

/// Capped exponential backoff
///
/// Attempt `n` (1-based) waits `min(base * 2^(n-1), cap)`. With jitter
/// enabled the wait is drawn uniformly from `[0, that value]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    base: Duration,
    cap: Duration,
    jitter: bool,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, cap: Duration, jitter: bool) -> Self {
        Self { base, cap, jitter }
    }

    pub fn cap(&self) -> Duration {
        self.cap
    }

    /// Delay after failed attempt `attempt`, before jitter
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        2u32.checked_pow(exponent)
            .and_then(|factor| self.base.checked_mul(factor))
            .map_or(self.cap, |delay| delay.min(self.cap))
    }

    /// Delay after failed attempt `attempt`, jitter applied
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay(attempt);
        if !self.jitter || delay.is_zero() {
            return delay;
        }

        let secs = rand::thread_rng().gen_range(0.0..=delay.as_secs_f64());
        Duration::from_secs_f64(secs).min(delay)
    }
}
