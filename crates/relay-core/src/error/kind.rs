//! Normalized failure taxonomy shared by every provider

use serde::{Deserialize, Serialize};

/// Kind of failure, independent of which provider produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The invocation did not complete within the target's timeout
    Timeout,
    /// The provider throttled the request (HTTP 429 and equivalents)
    RateLimited,
    /// Connection refused, reset, DNS failure and similar transport faults
    TransientNetwork,
    /// Provider-side failure (5xx and equivalents)
    ServerFault,
    /// Credentials missing, rejected or lacking permission
    AuthFailure,
    /// The provider rejected the request itself
    InvalidRequest,
    /// The provider does not know the requested model
    ModelNotFound,
    /// Routing configuration is invalid or references unknown targets
    ConfigError,
    /// The call was cancelled or its deadline elapsed
    Cancelled,
}

impl ErrorKind {
    /// Whether a failure of this kind is worth re-attempting against the same target
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::RateLimited | Self::TransientNetwork | Self::ServerFault
        )
    }

    /// Stable machine-readable code
    pub fn code(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::TransientNetwork => "transient_network",
            Self::ServerFault => "server_fault",
            Self::AuthFailure => "auth_failure",
            Self::InvalidRequest => "invalid_request",
            Self::ModelNotFound => "model_not_found",
            Self::ConfigError => "config_error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Map an HTTP status code onto the taxonomy
    ///
    /// Returns `None` for success codes.
    pub fn from_status(status: u16) -> Option<Self> {
        let kind = match status {
            200..=399 => return None,
            401 | 403 => Self::AuthFailure,
            404 => Self::ModelNotFound,
            408 => Self::Timeout,
            429 => Self::RateLimited,
            500..=599 => Self::ServerFault,
            _ => Self::InvalidRequest,
        };
        Some(kind)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_group() {
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(ErrorKind::TransientNetwork.is_retryable());
        assert!(ErrorKind::ServerFault.is_retryable());
    }

    #[test]
    fn test_non_retryable_group() {
        assert!(!ErrorKind::AuthFailure.is_retryable());
        assert!(!ErrorKind::InvalidRequest.is_retryable());
        assert!(!ErrorKind::ModelNotFound.is_retryable());
        assert!(!ErrorKind::ConfigError.is_retryable());
        assert!(!ErrorKind::Cancelled.is_retryable());
    }

    #[test]
    fn test_from_status() {
        assert_eq!(ErrorKind::from_status(200), None);
        assert_eq!(ErrorKind::from_status(401), Some(ErrorKind::AuthFailure));
        assert_eq!(ErrorKind::from_status(403), Some(ErrorKind::AuthFailure));
        assert_eq!(ErrorKind::from_status(404), Some(ErrorKind::ModelNotFound));
        assert_eq!(ErrorKind::from_status(408), Some(ErrorKind::Timeout));
        assert_eq!(ErrorKind::from_status(429), Some(ErrorKind::RateLimited));
        assert_eq!(ErrorKind::from_status(529), Some(ErrorKind::ServerFault));
        assert_eq!(ErrorKind::from_status(422), Some(ErrorKind::InvalidRequest));
    }

    #[test]
    fn test_display_uses_code() {
        assert_eq!(ErrorKind::RateLimited.to_string(), "rate_limited");
        assert_eq!(ErrorKind::ModelNotFound.to_string(), "model_not_found");
    }
}
