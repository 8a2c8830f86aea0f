//! Call-level cancellation: a token, a deadline, or both

use super::types::{CallOptions, CancelReason};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub(super) struct CallCancel {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl CallCancel {
    pub(super) fn from_options(options: &CallOptions) -> Self {
        Self {
            token: options.cancel.clone(),
            deadline: options.deadline,
        }
    }

    /// Reason the call must stop now, if any
    pub(super) fn check(&self) -> Option<CancelReason> {
        if self.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Some(CancelReason::Token);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(CancelReason::Deadline);
        }
        None
    }

    /// Resolves once the call is cancelled; never resolves without a token or deadline
    pub(super) async fn cancelled(&self) -> CancelReason {
        match (&self.token, self.deadline) {
            (Some(token), Some(deadline)) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => CancelReason::Token,
                    _ = sleep_until(deadline) => CancelReason::Deadline,
                }
            }
            (Some(token), None) => {
                token.cancelled().await;
                CancelReason::Token
            }
            (None, Some(deadline)) => {
                sleep_until(deadline).await;
                CancelReason::Deadline
            }
            (None, None) => std::future::pending().await,
        }
    }
}
