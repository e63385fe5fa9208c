//! Error types for remote calls.

use thiserror::Error;

use vwm_model::ErrorClass;

/// Errors from a single remote call.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure: refused, reset, DNS, TLS.
    #[error("connection error: {0}")]
    Connection(String),

    /// The call exceeded its time budget.
    #[error("request timed out")]
    Timeout,

    /// The service answered with something that is not the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The service answered with an unexpected HTTP status.
    #[error("service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The configured URL cannot be used to build endpoints.
    #[error("invalid service URL: {0}")]
    InvalidUrl(String),
}

impl SourceError {
    /// Classify for the fetch pipeline.
    ///
    /// Anything other than a timeout counts as a connection error; a
    /// malformed answer is never treated as data.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Timeout => ErrorClass::TimeoutError,
            Self::Connection(_) | Self::Malformed(_) | Self::Status { .. } | Self::InvalidUrl(_) => {
                ErrorClass::ConnectionError
            }
        }
    }

    /// Returns whether a later retry may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Malformed(_) | Self::InvalidUrl(_) => false,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Result type alias for remote calls.
pub type Result<T> = std::result::Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(SourceError::Timeout.class(), ErrorClass::TimeoutError);
        assert_eq!(
            SourceError::Connection("refused".into()).class(),
            ErrorClass::ConnectionError
        );
        assert_eq!(
            SourceError::Malformed("not json".into()).class(),
            ErrorClass::ConnectionError
        );
        assert_eq!(
            SourceError::Status {
                status: 503,
                body: String::new()
            }
            .class(),
            ErrorClass::ConnectionError
        );
    }

    #[test]
    fn test_retryable() {
        assert!(SourceError::Timeout.is_retryable());
        assert!(
            SourceError::Status {
                status: 429,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !SourceError::Status {
                status: 400,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!SourceError::Malformed("x".into()).is_retryable());
    }

    #[test]
    fn test_json_error_is_malformed() {
        let err: SourceError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, SourceError::Malformed(_)));
    }
}
