//! The transport seam and its HTTP implementation.
//!
//! The orchestrator hands a fully-shaped request to a [`Transport`] and
//! receives the response body back as a stream of byte chunks split at
//! arbitrary boundaries. Retry policy is deliberately absent here; the
//! errors carry a `retryable` flag and the decision belongs to the
//! caller.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use http::HeaderMap;
use llm_wire::error::WireError;
use serde::Deserialize;
use serde_json::Value;

/// A pinned, boxed, `Send` stream of response body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, WireError>> + Send>>;

/// One outbound exchange request, ready to send.
#[derive(Debug)]
pub struct TransportRequest {
    /// Full endpoint URL.
    pub url: String,
    /// Request headers, including authentication.
    pub headers: HeaderMap,
    /// JSON request body.
    pub body: Value,
}

/// Starts exchanges and streams their response bodies back.
pub trait Transport: Send + Sync {
    /// Begins the exchange. Resolves to the body stream once response
    /// headers have arrived, or to an error when the request itself
    /// fails (connection error, non-success status).
    fn dispatch<'a>(
        &'a self,
        request: TransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ByteStream, WireError>> + Send + 'a>>;
}

/// [`Transport`] implementation over a shared HTTP client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a fresh HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport over an existing client, for connection
    /// pooling with the rest of the application.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn dispatch<'a>(
        &'a self,
        request: TransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ByteStream, WireError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&request.url)
                .headers(request.headers)
                .json(&request.body)
                .send()
                .await
                .map_err(|e| WireError::Http {
                    status: e.status(),
                    message: e.to_string(),
                    retryable: e.is_connect() || e.is_timeout(),
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(status_error(status, &body));
            }

            let stream = response.bytes_stream().map(|chunk| {
                chunk.map_err(|e| WireError::Http {
                    status: None,
                    message: format!("stream read error: {e}"),
                    retryable: true,
                })
            });
            Ok(Box::pin(stream) as ByteStream)
        })
    }
}

/// Error body shape shared by the providers this workspace speaks.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Maps an HTTP status plus optional error body into a `WireError`.
pub(crate) fn status_error(status: http::StatusCode, body: &str) -> WireError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map_or_else(|_| body.to_string(), |e| e.error.message);

    if status == http::StatusCode::UNAUTHORIZED || status == http::StatusCode::FORBIDDEN {
        return WireError::Auth(message);
    }
    if status == http::StatusCode::BAD_REQUEST {
        return WireError::InvalidRequest(message);
    }

    let retryable = matches!(status.as_u16(), 429 | 500 | 502 | 503 | 529);
    WireError::Http {
        status: Some(status),
        message,
        retryable,
    }
}
