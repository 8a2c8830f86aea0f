//! Bedrock gateway invoker speaking the OpenAI-compatible protocol

use super::openai_compat::send_chat_completion;
use crate::config::ModelTarget;
use crate::error::ErrorKind;
use crate::invoker::{InvokeError, InvokeRequest, InvokeResponse, ProviderInvoker};
use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

/// Managed Bedrock endpoint
///
/// The gateway has no public default URL, so every target must carry its own
/// `base_url`. Token limits are sent as `max_completion_tokens`.
#[derive(Debug, Clone)]
pub struct BedrockOpenAiInvoker {
    http_client: Client,
}

impl BedrockOpenAiInvoker {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl ProviderInvoker for BedrockOpenAiInvoker {
    #[instrument(skip_all, fields(model = %target.model, region = ?target.region), level = "debug")]
    async fn invoke(
        &self,
        target: &ModelTarget,
        request: &InvokeRequest,
    ) -> Result<InvokeResponse, InvokeError> {
        let base_url = target
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .ok_or_else(|| {
                InvokeError::new(
                    ErrorKind::ConfigError,
                    format!("Bedrock target '{}' requires base_url", target.name),
                )
            })?;
        send_chat_completion(
            &self.http_client,
            base_url,
            target,
            request,
            "max_completion_tokens",
            "Bedrock",
        )
        .await
    }
}
