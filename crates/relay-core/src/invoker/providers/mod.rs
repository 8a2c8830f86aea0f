//! Invokers for the built-in provider families

mod anthropic;
mod bedrock;
mod bedrock_openai;
pub mod error_utils;
mod openai;
mod openai_compat;

pub use anthropic::AnthropicInvoker;
pub use bedrock::BedrockInvoker;
pub use bedrock_openai::BedrockOpenAiInvoker;
pub use openai::OpenAiInvoker;
