//! Invoker trait

use super::types::{InvokeError, InvokeRequest, InvokeResponse};
use crate::config::ModelTarget;
use async_trait::async_trait;

/// One call to one model on one provider
///
/// Implementations perform a single network request and map every failure
/// onto an [`InvokeError`]. Adding a provider family means implementing this
/// trait and registering it in an [`InvokerRegistry`](super::InvokerRegistry).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderInvoker: Send + Sync {
    async fn invoke(
        &self,
        target: &ModelTarget,
        request: &InvokeRequest,
    ) -> Result<InvokeResponse, InvokeError>;
}

/// Invoke with the request's timeout enforced
///
/// An elapsed timeout surfaces as a retryable `Timeout` error and drops the
/// in-flight call.
pub async fn invoke_with_timeout(
    invoker: &dyn ProviderInvoker,
    target: &ModelTarget,
    request: &InvokeRequest,
) -> Result<InvokeResponse, InvokeError> {
    match tokio::time::timeout(request.timeout, invoker.invoke(target, request)).await {
        Ok(result) => result,
        Err(_) => Err(InvokeError::timeout(request.timeout)),
    }
}
