//! OpenAI Chat Completions invoker

use super::openai_compat::send_chat_completion;
use crate::config::ModelTarget;
use crate::error::ErrorKind;
use crate::invoker::{InvokeError, InvokeRequest, InvokeResponse, ProviderInvoker};
use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

/// Direct OpenAI API
#[derive(Debug, Clone)]
pub struct OpenAiInvoker {
    http_client: Client,
}

impl OpenAiInvoker {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl ProviderInvoker for OpenAiInvoker {
    #[instrument(skip_all, fields(model = %target.model), level = "debug")]
    async fn invoke(
        &self,
        target: &ModelTarget,
        request: &InvokeRequest,
    ) -> Result<InvokeResponse, InvokeError> {
        let base_url = target.endpoint().ok_or_else(|| {
            InvokeError::new(ErrorKind::ConfigError, "OpenAI target has no endpoint")
        })?;
        send_chat_completion(
            &self.http_client,
            base_url,
            target,
            request,
            "max_tokens",
            "OpenAI",
        )
        .await
    }
}
