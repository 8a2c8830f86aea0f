//! Fallback engine tests


use super::FallbackEngine;
use crate::config::{FallbackChains, ModelTarget, ProviderKind, RouterConfig};
use crate::error::ErrorKind;
use crate::invoker::{InvokeError, InvokeRequest, InvokeResponse, InvokerRegistry, ProviderInvoker};
use crate::rate_limiter::RateGuard;
use crate::retry::RetryConfig;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Scripted behaviour of one invocation
#[derive(Debug, Clone, Copy)]
pub(super) enum Step {
    Reply(&'static str),
    Fail(ErrorKind),
    FailWithHint(ErrorKind, Duration),
    /// Never completes
    Hang,
}

/// Replays per-target scripts and records every call
#[derive(Default)]
pub(super) struct ScriptedInvoker {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<(String, Instant, InvokeRequest)>>,
}

impl ScriptedInvoker {
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(super) fn script(&self, target: &str, steps: impl IntoIterator<Item = Step>) {
        self.scripts
            .lock()
            .entry(target.to_string())
            .or_default()
            .extend(steps);
    }

    /// Targets in call order
    pub(super) fn called(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(name, _, _)| name.clone()).collect()
    }

    pub(super) fn call_count(&self, target: &str) -> usize {
        self.calls.lock().iter().filter(|(name, _, _)| name == target).count()
    }

    /// Gaps between consecutive calls of `target`
    pub(super) fn gaps(&self, target: &str) -> Vec<Duration> {
        let instants: Vec<Instant> = self
            .calls
            .lock()
            .iter()
            .filter(|(name, _, _)| name == target)
            .map(|(_, at, _)| *at)
            .collect();
        instants.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }

    pub(super) fn last_request(&self) -> Option<InvokeRequest> {
        self.calls.lock().last().map(|(_, _, request)| request.clone())
    }
}

#[async_trait]
impl ProviderInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        target: &ModelTarget,
        request: &InvokeRequest,
    ) -> Result<InvokeResponse, InvokeError> {
        self.calls
            .lock()
            .push((target.name.clone(), Instant::now(), request.clone()));
        let step = self
            .scripts
            .lock()
            .get_mut(&target.name)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Step::Reply("default reply"));

        match step {
            Step::Reply(text) => Ok(InvokeResponse::new(text, target.provider, &target.model)),
            Step::Fail(kind) => Err(InvokeError::new(kind, format!("{} failed", target.name))),
            Step::FailWithHint(kind, hint) => {
                Err(InvokeError::new(kind, "throttled").with_retry_after(hint))
            }
            Step::Hang => std::future::pending().await,
        }
    }
}

/// Targets `a`, `b`, `c` with `a -> [b, c]`
pub(super) fn abc_config() -> RouterConfig {
    RouterConfig::new(
        vec![
            ModelTarget::new("a", ProviderKind::OpenAi, "gpt-4o"),
            ModelTarget::new("b", ProviderKind::Anthropic, "claude-3-7-sonnet-latest"),
            ModelTarget::new("c", ProviderKind::BedrockOpenAi, "us.anthropic.claude-sonnet-4")
                .with_base_url("https://gateway.test/v1"),
        ],
        FallbackChains::new().with_rule("a", ["b", "c"]),
    )
    .with_retry(deterministic_retry())
}

pub(super) fn deterministic_retry() -> RetryConfig {
    RetryConfig::default().with_jitter(false)
}

/// Registry sending every provider to `invoker`
pub(super) fn registry_for(invoker: &Arc<ScriptedInvoker>) -> InvokerRegistry {
    let shared: Arc<dyn ProviderInvoker> = invoker.clone();
    InvokerRegistry::new()
        .with_provider(ProviderKind::OpenAi, shared.clone())
        .with_provider(ProviderKind::Anthropic, shared.clone())
        .with_provider(ProviderKind::BedrockOpenAi, shared)
}

pub(super) fn engine(config: RouterConfig, invoker: &Arc<ScriptedInvoker>) -> FallbackEngine {
    FallbackEngine::builder(config)
        .invokers(registry_for(invoker))
        .guard(Arc::new(RateGuard::new()))
        .build()
        .unwrap()
}
