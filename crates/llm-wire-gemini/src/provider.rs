//! Endpoint and header construction for the GenerateContent API.

use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use llm_wire::error::WireError;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Builds the full URL for the streaming endpoint of a model.
pub fn endpoint_url(base_url: &str, model: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/v1beta/models/{model}:streamGenerateContent?alt=sse")
}

/// Builds the request headers for an authenticated call.
pub fn request_headers(secret: &str) -> Result<HeaderMap, WireError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-goog-api-key",
        HeaderValue::from_str(secret)
            .map_err(|_| WireError::Auth("API key contains invalid header characters".into()))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}
