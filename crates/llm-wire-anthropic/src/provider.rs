//! Endpoint and header construction for the Messages API.

use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use llm_wire::error::WireError;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value.
pub const API_VERSION: &str = "2023-06-01";

/// Builds the full URL for the messages endpoint.
pub fn endpoint_url(base_url: &str, _model: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/v1/messages")
}

/// Builds the request headers for an authenticated call.
pub fn request_headers(secret: &str) -> Result<HeaderMap, WireError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-api-key",
        HeaderValue::from_str(secret)
            .map_err(|_| WireError::Auth("API key contains invalid header characters".into()))?,
    );
    headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url(DEFAULT_BASE_URL, "claude-sonnet-4-5"),
            "https://api.anthropic.com/v1/messages"
        );
    }

    #[test]
    fn test_endpoint_url_custom_base() {
        assert_eq!(
            endpoint_url("https://proxy.example.com/", "claude-sonnet-4-5"),
            "https://proxy.example.com/v1/messages"
        );
    }

    #[test]
    fn test_request_headers() {
        let headers = request_headers("sk-ant-test").unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "sk-ant-test");
        assert_eq!(headers.get("anthropic-version").unwrap(), API_VERSION);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_request_headers_invalid_secret() {
        let err = request_headers("bad\nkey").unwrap_err();
        assert!(matches!(err, WireError::Auth(_)));
    }
}
