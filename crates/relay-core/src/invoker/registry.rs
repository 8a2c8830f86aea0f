//! Invoker lookup by provider family

use super::provider::ProviderInvoker;
use super::providers::{AnthropicInvoker, BedrockInvoker, BedrockOpenAiInvoker, OpenAiInvoker};
use crate::config::{ModelTarget, ProviderKind};
use crate::error::{RelayError, RelayResult};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;

/// Invokers keyed by provider kind, with optional per-target overrides
#[derive(Clone, Default)]
pub struct InvokerRegistry {
    by_provider: HashMap<ProviderKind, Arc<dyn ProviderInvoker>>,
    by_target: HashMap<String, Arc<dyn ProviderInvoker>>,
}

impl InvokerRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with invokers for every built-in provider family
    ///
    /// `client` serves the HTTP providers; native Bedrock goes through the AWS SDK.
    pub fn http(client: Client) -> Self {
        Self::new()
            .with_provider(ProviderKind::Bedrock, Arc::new(BedrockInvoker::new()))
            .with_provider(ProviderKind::OpenAi, Arc::new(OpenAiInvoker::new(client.clone())))
            .with_provider(
                ProviderKind::Anthropic,
                Arc::new(AnthropicInvoker::new(client.clone())),
            )
            .with_provider(
                ProviderKind::BedrockOpenAi,
                Arc::new(BedrockOpenAiInvoker::new(client)),
            )
    }

    /// HTTP registry with a freshly built client
    pub fn with_default_client() -> RelayResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::http(client))
    }

    pub fn with_provider(mut self, kind: ProviderKind, invoker: Arc<dyn ProviderInvoker>) -> Self {
        self.by_provider.insert(kind, invoker);
        self
    }

    /// Use `invoker` for the target named `name` regardless of its provider
    pub fn with_target(mut self, name: impl Into<String>, invoker: Arc<dyn ProviderInvoker>) -> Self {
        self.by_target.insert(name.into(), invoker);
        self
    }

    /// Invoker responsible for `target`
    pub fn resolve(&self, target: &ModelTarget) -> Option<Arc<dyn ProviderInvoker>> {
        self.by_target
            .get(&target.name)
            .or_else(|| self.by_provider.get(&target.provider))
            .cloned()
    }
}

impl std::fmt::Debug for InvokerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvokerRegistry")
            .field("providers", &self.by_provider.keys().collect::<Vec<_>>())
            .field("targets", &self.by_target.keys().collect::<Vec<_>>())
            .finish()
    }
}
