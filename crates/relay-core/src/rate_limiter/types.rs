//! Admission results

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OwnedSemaphorePermit;

/// Result of asking the guard to admit one invocation
#[derive(Debug)]
pub enum Admission {
    /// The invocation may proceed; keep the permit alive until it ends
    Allowed(AdmissionPermit),
    /// The target is saturated right now
    Rejected {
        reason: RejectReason,
        /// When the target is expected to accept again, if known
        retry_after: Option<Duration>,
    },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }
}

/// Held for the duration of an admitted invocation
///
/// Dropping it releases the concurrency slot, if the target has one.
#[derive(Debug)]
pub struct AdmissionPermit {
    pub(super) _permit: Option<OwnedSemaphorePermit>,
}

/// Limit that caused a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The requests-per-window budget is used up
    RateLimit,
    /// All concurrency slots are taken
    Concurrency,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "rate limit"),
            Self::Concurrency => write!(f, "concurrency limit"),
        }
    }
}
