//! Rate and concurrency guard shared by all calls

use super::types::{Admission, AdmissionPermit, RejectReason};
use super::window::SlidingWindow;
use crate::config::{ModelTarget, defaults};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

#[derive(Debug)]
struct TargetLimiter {
    window: Option<SlidingWindow>,
    slots: Option<Arc<Semaphore>>,
    max_concurrent: Option<u32>,
}

/// Admission control keyed by target name
///
/// Limiters are created lazily from the target's `rpm` and `max_concurrent`
/// the first time a target is seen.
#[derive(Debug)]
pub struct RateGuard {
    limiters: DashMap<String, Arc<TargetLimiter>>,
    window: Duration,
}

impl RateGuard {
    pub fn new() -> Self {
        Self::with_window(defaults::rate_window())
    }

    /// Guard whose `rpm` budgets apply to a custom window length
    pub fn with_window(window: Duration) -> Self {
        Self {
            limiters: DashMap::new(),
            window,
        }
    }

    /// Try to admit one invocation of `target`
    ///
    /// The concurrency slot is taken before the window is charged, so a
    /// request rejected for concurrency does not consume rate budget.
    pub fn admit(&self, target: &ModelTarget) -> Admission {
        let limiter = self.limiter_for(target);

        let permit = match &limiter.slots {
            Some(slots) => match slots.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    debug!(target_name = %target.name, "Concurrency limit reached");
                    return Admission::Rejected {
                        reason: RejectReason::Concurrency,
                        retry_after: None,
                    };
                }
            },
            None => None,
        };

        if let Some(window) = &limiter.window {
            if let Err(wait) = window.try_record() {
                debug!(
                    target_name = %target.name,
                    retry_after_ms = wait.as_millis() as u64,
                    "Rate limit reached"
                );
                return Admission::Rejected {
                    reason: RejectReason::RateLimit,
                    retry_after: Some(wait),
                };
            }
        }

        Admission::Allowed(AdmissionPermit { _permit: permit })
    }

    /// Invocations of `name` currently holding a concurrency slot
    pub fn in_flight(&self, name: &str) -> usize {
        self.limiters
            .get(name)
            .and_then(|limiter| {
                let max = limiter.max_concurrent? as usize;
                let slots = limiter.slots.as_ref()?;
                Some(max - slots.available_permits())
            })
            .unwrap_or(0)
    }

    /// Requests of `name` counted in the current window
    pub fn window_count(&self, name: &str) -> usize {
        self.limiters
            .get(name)
            .and_then(|limiter| limiter.window.as_ref().map(SlidingWindow::current_count))
            .unwrap_or(0)
    }

    fn limiter_for(&self, target: &ModelTarget) -> Arc<TargetLimiter> {
        if let Some(limiter) = self.limiters.get(&target.name) {
            return Arc::clone(&limiter);
        }

        let entry = self.limiters.entry(target.name.clone()).or_insert_with(|| {
            Arc::new(TargetLimiter {
                window: target.rpm.map(|rpm| SlidingWindow::new(rpm, self.window)),
                slots: target
                    .max_concurrent
                    .map(|max| Arc::new(Semaphore::new(max as usize))),
                max_concurrent: target.max_concurrent,
            })
        });
        Arc::clone(&entry)
    }
}

impl Default for RateGuard {
    fn default() -> Self {
        Self::new()
    }
}
