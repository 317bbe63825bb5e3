//! Chat-completions request and response types.
//!
//! These types mirror the wire format and are not part of the public
//! vocabulary. Conversion from core types happens in
//! [`convert`](crate::convert).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Request types ──────────────────────────────────────────────────

/// Top-level request body for `POST /v1/chat/completions`.
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    /// Model identifier.
    pub model: &'a str,
    /// The conversation.
    pub messages: Vec<Message<'a>>,
    /// Always true; this crate only speaks the streaming protocol.
    pub stream: bool,
    /// Requests a final usage chunk on the stream.
    pub stream_options: StreamOptions,
    /// Resolved tuning parameters, merged at the top level.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// A single message in the conversation.
#[derive(Debug, Serialize)]
pub struct Message<'a> {
    /// Wire role name.
    pub role: &'static str,
    /// The message text.
    pub content: &'a str,
}

/// Streaming options attached to every request.
#[derive(Debug, Serialize)]
pub struct StreamOptions {
    /// Ask the API to append a usage chunk before `[DONE]`.
    pub include_usage: bool,
}

// ── Streaming types ────────────────────────────────────────────────

/// One parsed line of the streaming response.
#[derive(Debug, Deserialize)]
pub(crate) struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Present on the final chunk when usage was requested; null on
    /// every other chunk.
    pub usage: Option<ResponseUsage>,
}

/// One choice entry within a stream chunk.
#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub delta: Option<Delta>,
}

/// The incremental content of a choice.
#[derive(Debug, Deserialize)]
pub(crate) struct Delta {
    pub content: Option<String>,
}

/// Token usage as reported on the stream.
///
/// Field names match the API exactly.
#[derive(Debug, Deserialize)]
pub(crate) struct ResponseUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub prompt_tokens_details: Option<PromptTokensDetails>,
}

/// Cache accounting nested inside the usage block.
#[derive(Debug, Deserialize)]
pub(crate) struct PromptTokensDetails {
    pub cached_tokens: Option<u64>,
}
