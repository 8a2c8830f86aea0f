//! Native Amazon Bedrock invoker using the Converse API

use super::error_utils::{classify_error_code, sanitize_provider_error_text};
use crate::config::ModelTarget;
use crate::error::ErrorKind;
use crate::invoker::{InvokeError, InvokeRequest, InvokeResponse, ProviderInvoker, TokenUsage};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::operation::converse::ConverseError;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, ConverseOutput, InferenceConfiguration, Message,
    SystemContentBlock,
};
use dashmap::DashMap;
use tracing::{debug, instrument};

const PROVIDER: &str = "Bedrock";

/// Amazon Bedrock through the Converse API
///
/// Credentials come from the standard AWS chain (environment, profile,
/// instance role). One SDK client is built lazily per region and endpoint
/// override and reused for later calls.
#[derive(Debug, Default)]
pub struct BedrockInvoker {
    clients: DashMap<(String, Option<String>), Client>,
}

impl BedrockInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    async fn client_for(&self, target: &ModelTarget) -> Client {
        let key = (target.resolve_region(), target.endpoint().map(str::to_string));
        if let Some(client) = self.clients.get(&key) {
            return client.clone();
        }

        debug!(region = %key.0, endpoint = ?key.1, "Building Bedrock client");
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(key.0.clone()))
            .load()
            .await;
        let mut config = aws_sdk_bedrockruntime::config::Builder::from(&shared);
        if let Some(endpoint) = &key.1 {
            config = config.endpoint_url(endpoint);
        }
        let client = Client::from_conf(config.build());
        self.clients.entry(key).or_insert(client).clone()
    }
}

#[async_trait]
impl ProviderInvoker for BedrockInvoker {
    #[instrument(skip_all, fields(model = %target.model, region = %target.resolve_region()), level = "debug")]
    async fn invoke(
        &self,
        target: &ModelTarget,
        request: &InvokeRequest,
    ) -> Result<InvokeResponse, InvokeError> {
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(request.prompt.clone()))
            .build()
            .map_err(|e| {
                InvokeError::new(
                    ErrorKind::InvalidRequest,
                    format!("{} request could not be built: {}", PROVIDER, e),
                )
            })?;

        let client = self.client_for(target).await;
        let mut call = client
            .converse()
            .model_id(&target.model)
            .messages(message)
            .inference_config(inference_config(request));
        if let Some(system) = &request.system {
            call = call.system(SystemContentBlock::Text(system.clone()));
        }

        let output = call.send().await.map_err(|err| {
            let status = err.raw_response().map(|raw| raw.status().as_u16());
            converse_error(&err, status)
        })?;

        let message = match output.output() {
            Some(ConverseOutput::Message(message)) => message,
            _ => {
                return Err(InvokeError::new(
                    ErrorKind::ServerFault,
                    format!("{} response has no message output", PROVIDER),
                ));
            }
        };

        let mut response = InvokeResponse::new(message_text(message), target.provider, &target.model);
        if let Some(usage) = output.usage() {
            response = response.with_usage(TokenUsage::from_counts(
                u64::try_from(usage.input_tokens()).ok(),
                u64::try_from(usage.output_tokens()).ok(),
            ));
        }
        Ok(response)
    }
}

fn inference_config(request: &InvokeRequest) -> InferenceConfiguration {
    InferenceConfiguration::builder()
        .max_tokens(i32::try_from(request.max_tokens).unwrap_or(i32::MAX))
        .temperature(request.temperature)
        .build()
}

/// Concatenated text blocks of a Converse message
fn message_text(message: &Message) -> String {
    message
        .content()
        .iter()
        .filter_map(|block| block.as_text().ok())
        .map(String::as_str)
        .collect()
}

/// Where a Converse call broke down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureClass {
    /// The service answered with a modelled error
    Service,
    /// The SDK timed out waiting for the service
    Timeout,
    /// The request never reached the service
    Dispatch,
    /// The reply could not be read
    Response,
    /// The request could not be serialized
    Construction,
}

fn classify(class: FailureClass, code: Option<&str>, status: Option<u16>) -> ErrorKind {
    match class {
        FailureClass::Timeout => ErrorKind::Timeout,
        FailureClass::Dispatch => ErrorKind::TransientNetwork,
        FailureClass::Response => ErrorKind::ServerFault,
        FailureClass::Construction => ErrorKind::InvalidRequest,
        FailureClass::Service => code
            .and_then(classify_error_code)
            .or_else(|| status.and_then(ErrorKind::from_status))
            .unwrap_or(ErrorKind::ServerFault),
    }
}

fn converse_error<R>(err: &SdkError<ConverseError, R>, status: Option<u16>) -> InvokeError {
    let class = match err {
        SdkError::ServiceError(_) => FailureClass::Service,
        SdkError::TimeoutError(_) => FailureClass::Timeout,
        SdkError::DispatchFailure(failure) if failure.is_timeout() => FailureClass::Timeout,
        SdkError::DispatchFailure(_) => FailureClass::Dispatch,
        SdkError::ResponseError(_) => FailureClass::Response,
        SdkError::ConstructionFailure(_) => FailureClass::Construction,
        _ => FailureClass::Service,
    };
    let code = err.code();
    let kind = classify(class, code, status);
    let detail = err
        .message()
        .map(sanitize_provider_error_text)
        .unwrap_or_else(|| format!("{:?}", class).to_lowercase());

    let mut error = InvokeError::new(
        kind,
        format!("{} error ({}): {}", PROVIDER, code.unwrap_or("no code"), detail),
    );
    if let Some(status) = status {
        error = error.with_status(status);
    }
    error
}
