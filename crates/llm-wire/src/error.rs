//! Unified error type for the workspace.
//!
//! Only the transport and orchestration surface constructs errors.
//! Schema resolution degrades to empty results and stream extraction
//! swallows malformed input, so neither path ever produces a
//! [`WireError`]; a single bad line must not abort an otherwise-healthy
//! stream.
//!
//! # Retryability
//!
//! HTTP-level variants carry a `retryable` flag set from the upstream
//! response (e.g. 429 or 503). Callers deciding whether to re-dispatch
//! can use [`WireError::is_retryable`].

/// The unified error type returned by transport-facing operations.
///
/// Variants are `#[non_exhaustive]`; new error kinds may be added in
/// minor releases without breaking downstream matches (always include a
/// wildcard arm).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WireError {
    /// An HTTP-level failure (transport error, unexpected status code).
    ///
    /// `status` is `None` when the request never received a response
    /// (e.g. DNS failure, connection reset).
    #[error("HTTP error (status={status:?}): {message}")]
    Http {
        /// The HTTP status code, if one was received.
        status: Option<http::StatusCode>,
        /// A human-readable description of the failure.
        message: String,
        /// Whether the caller should retry this request.
        retryable: bool,
    },

    /// The API key or token was missing or rejected.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The request was malformed (missing fields, invalid parameters).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be parsed.
    #[error("Response format error: {message}")]
    ResponseFormat {
        /// What went wrong during parsing.
        message: String,
        /// The raw response body, for diagnostics.
        raw: String,
    },

    /// The operation exceeded its deadline.
    #[error("Operation timed out after {elapsed_ms}ms")]
    Timeout {
        /// Milliseconds elapsed before the timeout fired.
        elapsed_ms: u64,
    },
}

impl WireError {
    /// Returns `true` if the error is transient and the request may
    /// succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { retryable, .. } => *retryable,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for WireError {
    fn from(err: serde_json::Error) -> Self {
        Self::ResponseFormat {
            message: err.to_string(),
            raw: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_http() {
        let err = WireError::Http {
            status: Some(http::StatusCode::TOO_MANY_REQUESTS),
            message: "rate limited".into(),
            retryable: true,
        };
        let display = format!("{err}");
        assert!(display.contains("429"));
        assert!(display.contains("rate limited"));
    }

    #[test]
    fn test_error_display_auth() {
        let err = WireError::Auth("no key for anthropic".into());
        assert!(format!("{err}").contains("no key for anthropic"));
    }

    #[test]
    fn test_error_display_invalid_request() {
        let err = WireError::InvalidRequest("missing model".into());
        assert!(format!("{err}").contains("missing model"));
    }

    #[test]
    fn test_error_display_response_format() {
        let err = WireError::ResponseFormat {
            message: "not json".into(),
            raw: "hello".into(),
        };
        assert!(format!("{err}").contains("not json"));
    }

    #[test]
    fn test_error_display_timeout() {
        let err = WireError::Timeout { elapsed_ms: 5000 };
        assert!(format!("{err}").contains("5000"));
    }

    #[test]
    fn test_retryable_http() {
        let err = WireError::Http {
            status: Some(http::StatusCode::SERVICE_UNAVAILABLE),
            message: "overloaded".into(),
            retryable: true,
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_retryable_timeout() {
        assert!(WireError::Timeout { elapsed_ms: 100 }.is_retryable());
    }

    #[test]
    fn test_not_retryable_auth() {
        assert!(!WireError::Auth("bad key".into()).is_retryable());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
        let err: WireError = json_err.into();
        assert!(matches!(err, WireError::ResponseFormat { .. }));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WireError>();
    }
}
