//! Normalized invocation request, response and error

use crate::config::ProviderKind;
use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Request handed to a provider invoker, with target defaults already applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Usage from raw provider counts, saturating at `u32::MAX`
    pub fn from_counts(input: Option<u64>, output: Option<u64>) -> Self {
        let clamp = |count: Option<u64>| u32::try_from(count.unwrap_or(0)).unwrap_or(u32::MAX);
        Self {
            input_tokens: clamp(input),
            output_tokens: clamp(output),
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Successful invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// Generated text
    pub text: String,
    /// Provider family that served the call
    pub provider: ProviderKind,
    /// Model identifier the provider reports having used
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl InvokeResponse {
    pub fn new(text: impl Into<String>, provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider,
            model: model.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Failed invocation, classified into the shared taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct InvokeError {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status, when the failure came from a response
    pub status: Option<u16>,
    /// Provider-supplied hint for when to try again
    pub retry_after: Option<Duration>,
}

impl InvokeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            retry_after: None,
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("Invocation timed out after {:?}", after),
        )
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
