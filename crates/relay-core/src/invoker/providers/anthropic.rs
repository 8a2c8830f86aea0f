//! Anthropic Messages API invoker

use super::error_utils::{handle_http_error, handle_parse_error, handle_transport_error};
use super::openai_compat::require_api_key;
use crate::config::ModelTarget;
use crate::error::ErrorKind;
use crate::invoker::{InvokeError, InvokeRequest, InvokeResponse, ProviderInvoker, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

const API_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "Anthropic";

/// Direct Anthropic API
#[derive(Debug, Clone)]
pub struct AnthropicInvoker {
    http_client: Client,
}

impl AnthropicInvoker {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }
}

pub(super) fn build_messages_body(model: &str, request: &InvokeRequest) -> Value {
    let mut body = json!({
        "model": model,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "messages": [{"role": "user", "content": request.prompt}],
    });
    if let Some(system) = &request.system {
        body["system"] = json!(system);
    }
    body
}

pub(super) fn parse_messages_response(
    body: &Value,
    target: &ModelTarget,
) -> Result<InvokeResponse, InvokeError> {
    let blocks = body["content"]
        .as_array()
        .ok_or_else(|| handle_parse_error("missing content array", PROVIDER))?;
    let text: String = blocks
        .iter()
        .filter(|block| block["type"] == "text")
        .filter_map(|block| block["text"].as_str())
        .collect();
    let model = body["model"].as_str().unwrap_or(&target.model);

    let mut response = InvokeResponse::new(text, target.provider, model);
    if let Some(usage) = body.get("usage") {
        response = response.with_usage(TokenUsage::from_counts(
            usage["input_tokens"].as_u64(),
            usage["output_tokens"].as_u64(),
        ));
    }
    Ok(response)
}

#[async_trait]
impl ProviderInvoker for AnthropicInvoker {
    #[instrument(skip_all, fields(model = %target.model), level = "debug")]
    async fn invoke(
        &self,
        target: &ModelTarget,
        request: &InvokeRequest,
    ) -> Result<InvokeResponse, InvokeError> {
        let base_url = target.endpoint().ok_or_else(|| {
            InvokeError::new(ErrorKind::ConfigError, "Anthropic target has no endpoint")
        })?;
        let api_key = require_api_key(target, PROVIDER)?;
        let url = format!("{}/v1/messages", base_url);

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&build_messages_body(&target.model, request))
            .send()
            .await
            .map_err(|e| handle_transport_error(e, PROVIDER))?;

        if !response.status().is_success() {
            return Err(handle_http_error(response, PROVIDER).await);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| handle_parse_error(e, PROVIDER))?;
        parse_messages_response(&json, target)
    }
}
