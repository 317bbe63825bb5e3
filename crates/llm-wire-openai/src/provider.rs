//! Endpoint and header construction for the chat-completions API.

use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use llm_wire::error::WireError;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Builds the full URL for the chat-completions endpoint.
pub fn endpoint_url(base_url: &str, _model: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/v1/chat/completions")
}

/// Builds the request headers for an authenticated call.
pub fn request_headers(secret: &str) -> Result<HeaderMap, WireError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {secret}"))
            .map_err(|_| WireError::Auth("API key contains invalid header characters".into()))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url(DEFAULT_BASE_URL, "gpt-4o"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_endpoint_url_trailing_slash() {
        assert_eq!(
            endpoint_url("http://localhost:8080/", "gpt-4o"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_headers() {
        let headers = request_headers("sk-test").unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer sk-test");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_request_headers_invalid_secret() {
        let err = request_headers("bad\nkey").unwrap_err();
        assert!(matches!(err, WireError::Auth(_)));
    }
}
