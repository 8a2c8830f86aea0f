//! Model target definitions

use super::defaults;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider family a target is served by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// OpenAI Chat Completions API
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic Messages API
    #[serde(rename = "anthropic")]
    Anthropic,
    /// Amazon Bedrock Converse API, authenticated with AWS credentials
    #[serde(rename = "bedrock")]
    Bedrock,
    /// Managed Bedrock gateway speaking the OpenAI-compatible protocol
    #[serde(rename = "bedrock_openai")]
    BedrockOpenAi,
}

impl ProviderKind {
    /// Provider name as used in labels and configuration
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Bedrock => "bedrock",
            Self::BedrockOpenAi => "bedrock_openai",
        }
    }

    /// Base URL used when a target does not set one
    ///
    /// Gateways have no public default and must be configured explicitly.
    /// Native Bedrock derives its endpoint from the region.
    pub fn default_base_url(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::Anthropic => Some("https://api.anthropic.com"),
            Self::Bedrock | Self::BedrockOpenAi => None,
        }
    }

    /// Environment variable consulted when a target names no key source
    pub fn default_key_env(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Bedrock => None,
            Self::BedrockOpenAi => Some("BEDROCK_OPENAI_API_KEY"),
        }
    }

    /// Whether calls authenticate with an API key rather than AWS credentials
    pub fn uses_api_key(self) -> bool {
        !matches!(self, Self::Bedrock)
    }

    /// Whether this provider is a managed gateway rather than a direct API
    pub fn is_gateway(self) -> bool {
        matches!(self, Self::BedrockOpenAi)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Generation parameters applied to every invocation of a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationParams {
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Timeout for a single invocation
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for InvocationParams {
    fn default() -> Self {
        Self {
            temperature: defaults::TEMPERATURE,
            max_tokens: defaults::MAX_TOKENS,
            timeout: defaults::request_timeout(),
        }
    }
}

/// One invocable (provider, model) destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTarget {
    /// Logical name, unique within a configuration
    pub name: String,
    /// Provider family
    pub provider: ProviderKind,
    /// Provider-specific model identifier
    pub model: String,
    /// Endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Literal API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// AWS region for native Bedrock; informational for gateways
    #[serde(default, alias = "aws_region_name", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(flatten)]
    pub params: InvocationParams,
    /// Requests per minute admitted by the local guard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u32>,
    /// In-flight invocations admitted by the local guard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<u32>,
}

impl ModelTarget {
    /// Create a target with default parameters and no limits
    pub fn new(name: impl Into<String>, provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider,
            model: model.into(),
            base_url: None,
            api_key: None,
            api_key_env: None,
            region: None,
            params: InvocationParams::default(),
            rpm: None,
            max_concurrent: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_rpm(mut self, rpm: u32) -> Self {
        self.rpm = Some(rpm);
        self
    }

    pub fn with_max_concurrent(mut self, max: u32) -> Self {
        self.max_concurrent = Some(max);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.params.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.params.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.params.max_tokens = max_tokens;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Endpoint to call, falling back to the provider default
    pub fn endpoint(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .or_else(|| self.provider.default_base_url())
            .map(|url| url.trim_end_matches('/'))
    }

    /// Resolve the API key: literal key, then `api_key_env`, then the provider's variable
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            return Some(key.to_string());
        }

        let var = self
            .api_key_env
            .as_deref()
            .or_else(|| self.provider.default_key_env())?;
        std::env::var(var)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    /// AWS region: the target's own, then `AWS_REGION`, then the default
    pub fn resolve_region(&self) -> String {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var("AWS_REGION")
                    .ok()
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
            })
            .unwrap_or_else(|| defaults::BEDROCK_REGION.to_string())
    }

    /// `<provider>:<model>` label identifying who served a response
    pub fn label(&self) -> String {
        format!("{}:{}", self.provider, self.model)
    }
}
