//! Relay Core Library
//!
//! Routes one logical model request across a chain of provider targets,
//! retrying transient failures and falling back to alternates until one
//! target answers. Configuration, invokers for the built-in providers, the
//! rate guard and the fallback engine all live here.

pub mod config;
pub mod error;
pub mod fallback;
pub mod invoker;
pub mod rate_limiter;
pub mod resolver;
pub mod retry;

// Re-export commonly used types
pub use config::{FallbackChains, InvocationParams, ModelTarget, ProviderKind, RouterConfig};
pub use error::{ErrorKind, RelayError, RelayResult};
pub use fallback::{
    Attempt, AttemptOutcome, CallOptions, CancelReason, ChainFailure, FallbackEngine,
    FallbackEngineBuilder, RouteError, RouteRequest, RouteSuccess, RouterResult, SkippedTarget,
    TargetReport,
};
pub use invoker::{
    InvokeError, InvokeRequest, InvokeResponse, InvokerRegistry, ProviderInvoker, TokenUsage,
};
pub use rate_limiter::{Admission, RateGuard, RejectReason};
pub use resolver::ChainResolver;
pub use retry::{GiveUpReason, RetryConfig, RetryDecision, RetryPolicy};
