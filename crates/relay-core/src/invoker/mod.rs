//! Provider invocation
//!
//! A [`ProviderInvoker`] performs exactly one call against one target and
//! reports a normalized response or a normalized [`InvokeError`]. It never
//! retries; retry and fallback decisions belong to the engine.

mod provider;
pub mod providers;
mod registry;
mod types;


pub use provider::{ProviderInvoker, invoke_with_timeout};
pub use registry::InvokerRegistry;
pub use types::{InvokeError, InvokeRequest, InvokeResponse, TokenUsage};

#[cfg(test)]
pub use provider::MockProviderInvoker;
