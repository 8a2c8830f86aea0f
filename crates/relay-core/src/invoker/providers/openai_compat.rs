//! Shared Chat Completions call for OpenAI-compatible endpoints

use super::error_utils::{handle_http_error, handle_parse_error, handle_transport_error};
use crate::config::ModelTarget;
use crate::error::ErrorKind;
use crate::invoker::{InvokeError, InvokeRequest, InvokeResponse, TokenUsage};
use reqwest::Client;
use serde_json::{Value, json};

/// Build a Chat Completions request body.
///
/// `tokens_field` is `max_tokens` for the public API and
/// `max_completion_tokens` for gateways that reject the older name.
pub(super) fn build_chat_body(model: &str, request: &InvokeRequest, tokens_field: &str) -> Value {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system {
        messages.push(json!({"role": "system", "content": system}));
    }
    messages.push(json!({"role": "user", "content": request.prompt}));

    let mut body = json!({
        "model": model,
        "messages": messages,
        "temperature": request.temperature,
    });
    body[tokens_field] = json!(request.max_tokens);
    body
}

/// Extract text, model and usage from a Chat Completions response
pub(super) fn parse_chat_response(
    body: &Value,
    target: &ModelTarget,
    provider: &str,
) -> Result<InvokeResponse, InvokeError> {
    let text = body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| handle_parse_error("missing choices[0].message.content", provider))?;
    let model = body["model"].as_str().unwrap_or(&target.model);

    let mut response = InvokeResponse::new(text, target.provider, model);
    if let Some(usage) = body.get("usage") {
        response = response.with_usage(TokenUsage::from_counts(
            usage["prompt_tokens"].as_u64(),
            usage["completion_tokens"].as_u64(),
        ));
    }
    Ok(response)
}

pub(super) fn require_api_key(target: &ModelTarget, provider: &str) -> Result<String, InvokeError> {
    target.resolve_api_key().ok_or_else(|| {
        InvokeError::new(
            ErrorKind::AuthFailure,
            format!("No {} API key configured for target '{}'", provider, target.name),
        )
    })
}

/// POST `{base_url}/chat/completions` and normalize the outcome
pub(super) async fn send_chat_completion(
    client: &Client,
    base_url: &str,
    target: &ModelTarget,
    request: &InvokeRequest,
    tokens_field: &str,
    provider: &str,
) -> Result<InvokeResponse, InvokeError> {
    let api_key = require_api_key(target, provider)?;
    let url = format!("{}/chat/completions", base_url);
    let body = build_chat_body(&target.model, request, tokens_field);

    let response = client
        .post(&url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| handle_transport_error(e, provider))?;

    if !response.status().is_success() {
        return Err(handle_http_error(response, provider).await);
    }

    let json: Value = response
        .json()
        .await
        .map_err(|e| handle_parse_error(e, provider))?;
    parse_chat_response(&json, target, provider)
}
