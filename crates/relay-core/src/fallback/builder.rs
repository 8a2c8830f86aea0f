//! Builder for the fallback engine

use super::engine::FallbackEngine;
use crate::config::RouterConfig;
use crate::error::RelayResult;
use crate::invoker::InvokerRegistry;
use crate::rate_limiter::RateGuard;
use crate::retry::RetryPolicy;
use std::sync::Arc;

/// Builder for [`FallbackEngine`]
///
/// Unset parts default to the HTTP invokers, a fresh guard and the retry
/// policy described by the configuration.
pub struct FallbackEngineBuilder {
    config: Arc<RouterConfig>,
    invokers: Option<InvokerRegistry>,
    guard: Option<Arc<RateGuard>>,
    policy: Option<RetryPolicy>,
}

impl FallbackEngineBuilder {
    pub fn new(config: impl Into<Arc<RouterConfig>>) -> Self {
        Self {
            config: config.into(),
            invokers: None,
            guard: None,
            policy: None,
        }
    }

    pub fn invokers(mut self, invokers: InvokerRegistry) -> Self {
        self.invokers = Some(invokers);
        self
    }

    /// Share a guard between engines
    pub fn guard(mut self, guard: Arc<RateGuard>) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Validate the configuration and build the engine
    pub fn build(self) -> RelayResult<FallbackEngine> {
        self.config.validate()?;

        let invokers = match self.invokers {
            Some(invokers) => invokers,
            None => InvokerRegistry::with_default_client()?,
        };
        let policy = self
            .policy
            .unwrap_or_else(|| RetryPolicy::new(self.config.retry.clone()));

        Ok(FallbackEngine {
            config: self.config,
            invokers,
            guard: self.guard.unwrap_or_default(),
            policy,
        })
    }
}
