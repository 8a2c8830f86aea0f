//! Core error type for relay

use super::ErrorKind;
use thiserror::Error;

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Crate-wide error for everything outside a single provider invocation
#[derive(Error, Debug, Clone)]
pub enum RelayError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// HTTP client setup errors
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// Invalid caller input
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },
}

impl RelayError {
    /// Error kind this error maps to in the routing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::ConfigError,
            Self::InvalidInput { .. } => ErrorKind::InvalidRequest,
            Self::Io { .. } | Self::Http { .. } => ErrorKind::ConfigError,
        }
    }

    /// Error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "RELAY_CONFIG",
            Self::Io { .. } => "RELAY_IO",
            Self::Http { .. } => "RELAY_HTTP",
            Self::InvalidInput { .. } => "RELAY_INVALID_INPUT",
        }
    }

    /// Optional context about where the error occurred
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } => context.as_deref(),
            Self::Io { path, .. } => path.as_deref(),
            Self::InvalidInput { field, .. } => field.as_deref(),
            Self::Http { .. } => None,
        }
    }
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            path: None,
        }
    }
}
