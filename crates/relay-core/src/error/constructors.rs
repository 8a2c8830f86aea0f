//! Constructor methods for RelayError

use super::types::RelayError;

impl RelayError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create an IO error tied to a path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create an HTTP client error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error for a specific field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ErrorKind, RelayError};

    #[test]
    fn test_config_error_display() {
        let err = RelayError::config("unknown target 'x'");
        assert_eq!(err.to_string(), "Configuration error: unknown target 'x'");
        assert_eq!(err.error_code(), "RELAY_CONFIG");
        assert_eq!(err.kind(), ErrorKind::ConfigError);
    }

    #[test]
    fn test_context_is_exposed() {
        let err = RelayError::config_with_context("bad value", "targets[2].rpm");
        assert_eq!(err.context(), Some("targets[2].rpm"));

        let err = RelayError::invalid_field("prompt", "must not be empty");
        assert_eq!(err.context(), Some("prompt"));
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
}
