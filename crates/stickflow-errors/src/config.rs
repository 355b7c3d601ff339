//! Errors raised while loading configuration or building rule chains.

use crate::common::ErrorSeverity;

/// Configuration loading and validation errors.
///
/// Numeric tuning parameters are clamped rather than rejected, so these
/// errors only cover things that cannot be repaired: unreadable files,
/// malformed JSON, and trigger expressions that do not parse.
///
/// # Examples
///
/// ```
/// use stickflow_errors::{ConfigError, ErrorSeverity};
///
/// let err = ConfigError::invalid_trigger("L1+FOO", "unknown input 'FOO'");
/// assert_eq!(err.severity(), ErrorSeverity::Error);
/// assert!(err.to_string().contains("L1+FOO"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the configuration file failed
    #[error("Failed to read configuration from {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not valid JSON for the schema
    #[error("Invalid configuration format: {0}")]
    Parse(String),

    /// A rule trigger expression does not parse
    #[error("Invalid trigger expression '{expression}': {reason}")]
    InvalidTrigger {
        /// The expression as written in the configuration
        expression: String,
        /// Why it was rejected
        reason: String,
    },

    /// Serialising the configuration failed
    #[error("Failed to serialise configuration: {0}")]
    Serialize(String),
}

impl ConfigError {
    /// Create an invalid-trigger error.
    pub fn invalid_trigger(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidTrigger {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ConfigError::Io { .. } => ErrorSeverity::Error,
            ConfigError::Parse(_) => ErrorSeverity::Error,
            ConfigError::InvalidTrigger { .. } => ErrorSeverity::Error,
            ConfigError::Serialize(_) => ErrorSeverity::Warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_keeps_source() {
        let err = ConfigError::Io {
            path: "missing.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "nope"),
        };
        assert!(err.to_string().contains("missing.json"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn parse_error_message() {
        let err = ConfigError::Parse("expected value at line 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration format: expected value at line 1"
        );
    }
}
