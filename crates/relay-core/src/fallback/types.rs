//! Request, option and outcome types of a routed call

use crate::config::ModelTarget;
use crate::error::{ErrorKind, RelayError, RelayResult};
use crate::invoker::{InvokeRequest, InvokeResponse};
use crate::rate_limiter::RejectReason;
use crate::retry::GiveUpReason;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// What the caller wants answered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Overrides the target's temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Overrides the target's max tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl RouteRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn validate(&self) -> RelayResult<()> {
        if self.prompt.trim().is_empty() {
            return Err(RelayError::invalid_field("prompt", "Prompt cannot be empty"));
        }
        if let Some(temperature) = self.temperature {
            if !temperature.is_finite() || temperature < 0.0 {
                return Err(RelayError::invalid_field(
                    "temperature",
                    format!("Invalid temperature {}", temperature),
                ));
            }
        }
        if self.max_tokens == Some(0) {
            return Err(RelayError::invalid_field("max_tokens", "max_tokens must be positive"));
        }
        Ok(())
    }

    /// Provider request for `target`, with the target's parameters as defaults
    pub fn for_target(&self, target: &ModelTarget) -> InvokeRequest {
        InvokeRequest {
            prompt: self.prompt.clone(),
            system: self.system.clone(),
            temperature: self.temperature.unwrap_or(target.params.temperature),
            max_tokens: self.max_tokens.unwrap_or(target.params.max_tokens),
            timeout: target.params.timeout,
        }
    }
}

/// Per-call options
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// Explicit chain replacing the configured fallbacks
    pub chain: Option<Vec<String>>,
    /// Instant after which no attempt may continue
    pub deadline: Option<Instant>,
    /// Caller-side cancellation
    pub cancel: Option<CancellationToken>,
    /// When false only the first target of the chain is tried
    pub allow_fallback: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            chain: None,
            deadline: None,
            cancel: None,
            allow_fallback: true,
        }
    }
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain<I, S>(mut self, chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chain = Some(chain.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn without_fallback(mut self) -> Self {
        self.allow_fallback = false;
        self
    }
}

/// How one invocation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded,
    Failed { kind: ErrorKind, message: String },
    /// In flight when the call was cancelled
    Abandoned,
}

/// One invocation of one target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    pub target: String,
    /// 1-based per target
    pub number: u32,
    pub outcome: AttemptOutcome,
    #[serde(with = "humantime_serde")]
    pub latency: Duration,
    pub started_at: DateTime<Utc>,
    /// Delay scheduled before the next attempt on the same target
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub backoff: Option<Duration>,
}

impl Attempt {
    pub fn is_success(&self) -> bool {
        self.outcome == AttemptOutcome::Succeeded
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.outcome {
            AttemptOutcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Summary of a target that was invoked and given up on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetReport {
    pub target: String,
    /// `provider:model`
    pub label: String,
    pub attempts: u32,
    pub last_error: ErrorKind,
    pub message: String,
    pub give_up: GiveUpReason,
}

/// Target passed over because the guard refused it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTarget {
    pub target: String,
    pub reason: RejectReason,
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<Duration>,
}

/// Winning outcome of a routed call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSuccess {
    /// Logical name of the target that answered
    pub target: String,
    /// `provider:model` of the target that answered
    pub label: String,
    pub response: InvokeResponse,
    /// Every invocation of the call, in order
    pub attempts: Vec<Attempt>,
    pub skipped: Vec<SkippedTarget>,
}

impl RouteSuccess {
    pub fn text(&self) -> &str {
        &self.response.text
    }

    /// Invocations made against `target`
    pub fn attempts_for(&self, target: &str) -> usize {
        self.attempts.iter().filter(|a| a.target == target).count()
    }
}

/// Every target failed or was skipped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainFailure {
    /// One entry per invoked target, in chain order
    pub targets: Vec<TargetReport>,
    pub skipped: Vec<SkippedTarget>,
    pub attempts: Vec<Attempt>,
    pub final_kind: ErrorKind,
}

impl std::fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "All targets failed ({})", self.final_kind)?;
        for report in &self.targets {
            write!(
                f,
                "; {}: {} after {} attempt(s)",
                report.target, report.last_error, report.attempts
            )?;
        }
        for skipped in &self.skipped {
            write!(f, "; {}: skipped ({})", skipped.target, skipped.reason)?;
        }
        Ok(())
    }
}

/// What stopped a cancelled call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    Token,
    Deadline,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token => write!(f, "cancellation token"),
            Self::Deadline => write!(f, "deadline"),
        }
    }
}

/// Call-level failure
#[derive(Debug, Error)]
pub enum RouteError {
    /// Invalid configuration or request, raised before any invocation
    #[error(transparent)]
    Config(#[from] RelayError),

    #[error("Call cancelled by {reason} after {count} attempt(s)", count = .attempts.len())]
    Cancelled {
        reason: CancelReason,
        attempts: Vec<Attempt>,
    },

    #[error("{0}")]
    ChainExhausted(ChainFailure),
}

impl RouteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(err) => err.kind(),
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::ChainExhausted(failure) => failure.final_kind,
        }
    }

    /// Invocations made before the call failed
    pub fn attempts(&self) -> &[Attempt] {
        match self {
            Self::Config(_) => &[],
            Self::Cancelled { attempts, .. } => attempts,
            Self::ChainExhausted(failure) => &failure.attempts,
        }
    }
}

/// Result of a routed call
pub type RouterResult = Result<RouteSuccess, RouteError>;
