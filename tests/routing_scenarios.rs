//! End-to-end routing through the public API with a fake provider

use async_trait::async_trait;
use parking_lot::Mutex;
use relay::{
    AttemptOutcome, CallOptions, ErrorKind, FallbackChains, FallbackEngine, GiveUpReason,
    InvokeError, InvokeRequest, InvokeResponse, InvokerRegistry, ModelTarget, ProviderInvoker,
    ProviderKind, RateGuard, RouteError, RouteRequest, RouterConfig, RetryConfig,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Provider that fails each target a fixed number of times before answering
#[derive(Default)]
struct FlakyProvider {
    failures: Mutex<HashMap<String, VecDeque<ErrorKind>>>,
    log: Mutex<Vec<String>>,
}

impl FlakyProvider {
    fn failing(plan: &[(&str, &[ErrorKind])]) -> Arc<Self> {
        let provider = Self::default();
        {
            let mut failures = provider.failures.lock();
            for (target, kinds) in plan {
                failures.insert(target.to_string(), kinds.iter().copied().collect());
            }
        }
        Arc::new(provider)
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

#[async_trait]
impl ProviderInvoker for FlakyProvider {
    async fn invoke(
        &self,
        target: &ModelTarget,
        _request: &InvokeRequest,
    ) -> Result<InvokeResponse, InvokeError> {
        self.log.lock().push(target.name.clone());
        let next = self
            .failures
            .lock()
            .get_mut(&target.name)
            .and_then(VecDeque::pop_front);
        match next {
            Some(kind) => Err(InvokeError::new(kind, format!("{} failed", target.name))),
            None => Ok(InvokeResponse::new(
                format!("answer from {}", target.name),
                target.provider,
                target.model.clone(),
            )),
        }
    }
}

fn config() -> RouterConfig {
    RouterConfig::new(
        vec![
            ModelTarget::new("primary", ProviderKind::OpenAi, "gpt-4o"),
            ModelTarget::new("secondary", ProviderKind::Anthropic, "claude-3-7-sonnet-latest"),
            ModelTarget::new("tertiary", ProviderKind::BedrockOpenAi, "claude-gw")
                .with_base_url("https://gateway.test/v1"),
        ],
        FallbackChains::new().with_rule("primary", ["secondary", "tertiary"]),
    )
    .with_retry(
        RetryConfig::default()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(1))
            .with_jitter(false),
    )
}

fn engine(provider: Arc<FlakyProvider>, guard: Arc<RateGuard>) -> FallbackEngine {
    let registry = InvokerRegistry::new()
        .with_provider(ProviderKind::OpenAi, provider.clone())
        .with_provider(ProviderKind::Anthropic, provider.clone())
        .with_provider(ProviderKind::BedrockOpenAi, provider);
    FallbackEngine::builder(config())
        .invokers(registry)
        .guard(guard)
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_falls_back_after_retries_exhausted() {
    use ErrorKind::*;
    let provider = FlakyProvider::failing(&[
        ("primary", &[ServerFault, ServerFault, ServerFault]),
        ("secondary", &[RateLimited]),
    ]);
    let engine = engine(provider.clone(), Arc::new(RateGuard::new()));

    let success = engine
        .route("primary", RouteRequest::new("hi"), CallOptions::default())
        .await
        .unwrap();

    assert_eq!(success.target, "secondary");
    assert_eq!(success.text(), "answer from secondary");
    assert_eq!(
        provider.log(),
        ["primary", "primary", "primary", "secondary", "secondary"]
    );
    assert_eq!(success.attempts_for("primary"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_non_retryable_error_moves_on_immediately() {
    let provider = FlakyProvider::failing(&[("primary", &[ErrorKind::AuthFailure])]);
    let engine = engine(provider.clone(), Arc::new(RateGuard::new()));

    let success = engine
        .route("primary", RouteRequest::new("hi"), CallOptions::default())
        .await
        .unwrap();

    assert_eq!(success.target, "secondary");
    assert_eq!(provider.log(), ["primary", "secondary"]);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_chain_reports_every_target() {
    use ErrorKind::*;
    let provider = FlakyProvider::failing(&[
        ("primary", &[ModelNotFound]),
        ("secondary", &[InvalidRequest]),
        ("tertiary", &[Timeout, Timeout, Timeout]),
    ]);
    let engine = engine(provider, Arc::new(RateGuard::new()));

    let err = engine
        .route("primary", RouteRequest::new("hi"), CallOptions::default())
        .await
        .unwrap_err();

    let failure = match err {
        RouteError::ChainExhausted(failure) => failure,
        other => panic!("expected exhausted chain, got {other:?}"),
    };
    let targets: Vec<_> = failure.targets.iter().map(|r| r.target.as_str()).collect();
    assert_eq!(targets, ["primary", "secondary", "tertiary"]);
    assert_eq!(failure.targets[0].give_up, GiveUpReason::NonRetryable);
    assert_eq!(failure.targets[2].give_up, GiveUpReason::AttemptsExhausted);
    assert_eq!(failure.final_kind, Timeout);
    assert_eq!(failure.attempts.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_no_fallback_stops_at_primary() {
    let provider = FlakyProvider::failing(&[("primary", &[ErrorKind::AuthFailure])]);
    let engine = engine(provider.clone(), Arc::new(RateGuard::new()));

    let err = engine
        .route(
            "primary",
            RouteRequest::new("hi"),
            CallOptions::default().without_fallback(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AuthFailure);
    assert_eq!(provider.log(), ["primary"]);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_chain_replaces_configured_fallbacks() {
    let provider = FlakyProvider::failing(&[("tertiary", &[ErrorKind::AuthFailure])]);
    let engine = engine(provider.clone(), Arc::new(RateGuard::new()));

    let success = engine
        .route(
            "primary",
            RouteRequest::new("hi"),
            CallOptions::default().with_chain(["tertiary", "secondary"]),
        )
        .await
        .unwrap();

    assert_eq!(success.target, "secondary");
    assert_eq!(provider.log(), ["tertiary", "secondary"]);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_primary_is_skipped() {
    let provider = FlakyProvider::failing(&[]);
    let guard = Arc::new(RateGuard::new());
    let limited = ModelTarget::new("primary", ProviderKind::OpenAi, "gpt-4o").with_rpm(1);
    assert!(guard.admit(&limited).is_allowed());

    let mut config = config();
    config.targets[0] = limited;
    let registry = InvokerRegistry::new()
        .with_provider(ProviderKind::OpenAi, provider.clone())
        .with_provider(ProviderKind::Anthropic, provider.clone())
        .with_provider(ProviderKind::BedrockOpenAi, provider.clone());
    let engine = FallbackEngine::builder(config)
        .invokers(registry)
        .guard(guard)
        .build()
        .unwrap();

    let success = engine
        .route("primary", RouteRequest::new("hi"), CallOptions::default())
        .await
        .unwrap();

    assert_eq!(success.target, "secondary");
    assert_eq!(success.skipped.len(), 1);
    assert_eq!(success.skipped[0].target, "primary");
    assert_eq!(provider.log(), ["secondary"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_token_stops_before_any_invocation() {
    let provider = FlakyProvider::failing(&[]);
    let engine = engine(provider.clone(), Arc::new(RateGuard::new()));
    let token = CancellationToken::new();
    token.cancel();

    let err = engine
        .route(
            "primary",
            RouteRequest::new("hi"),
            CallOptions::default().with_cancel(token),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(provider.log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_route_by_model_id() {
    let provider = FlakyProvider::failing(&[]);
    let engine = engine(provider, Arc::new(RateGuard::new()));

    let success = engine
        .route_model_id(
            "claude-3-7-sonnet-latest",
            RouteRequest::new("hi"),
            CallOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(success.target, "secondary");
    assert!(matches!(success.attempts[0].outcome, AttemptOutcome::Succeeded));

    let err = engine
        .route_model_id("unknown", RouteRequest::new("hi"), CallOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RouteError::Config(_)));
}
