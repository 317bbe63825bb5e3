//! Messages-API request and response types.
//!
//! These types mirror the wire format and are not part of the public
//! vocabulary. Conversion from core types happens in
//! [`convert`](crate::convert).

use llm_wire::chat::CacheControl;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Request types ──────────────────────────────────────────────────

/// Top-level request body for `POST /v1/messages`.
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    /// Model identifier.
    pub model: &'a str,
    /// The conversation, minus the leading system run.
    pub messages: Vec<Message<'a>>,
    /// Always true; this crate only speaks the streaming protocol.
    pub stream: bool,
    /// The leading system messages, in order. Omitted entirely when
    /// the conversation has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<Vec<SystemBlock<'a>>>,
    /// Provider-hosted tool descriptors, present only when the session
    /// flag enables them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ServerTool>>,
    /// Resolved tuning parameters, merged at the top level.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// A single message in the conversation.
#[derive(Debug, Serialize)]
pub struct Message<'a> {
    /// Wire role name.
    pub role: &'static str,
    /// The message content, as plain text or annotated blocks.
    pub content: MessageContent<'a>,
}

/// Message content: a bare string unless annotations force block form.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageContent<'a> {
    /// Plain text content.
    Text(&'a str),
    /// Block form, used when a cache-control annotation must travel
    /// with the text.
    Blocks(Vec<ContentBlock<'a>>),
}

/// A text content block.
#[derive(Debug, Serialize)]
pub struct ContentBlock<'a> {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub block_type: &'static str,
    /// The block text.
    pub text: &'a str,
    /// Prompt-caching annotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
}

/// One entry of the dedicated `system` array.
#[derive(Debug, Serialize)]
pub struct SystemBlock<'a> {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub block_type: &'static str,
    /// The system text.
    pub text: &'a str,
    /// Prompt-caching annotation, preserved from the source message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
}

/// A provider-hosted tool descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct ServerTool {
    /// Versioned tool type identifier.
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    /// Tool name.
    pub name: &'static str,
}

// ── Streaming types ────────────────────────────────────────────────

/// One parsed event line of the streaming response.
#[derive(Debug, Deserialize)]
pub(crate) struct StreamResponse {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Content block (for `content_block_start`).
    pub content_block: Option<StreamContentBlock>,
    /// Delta (for `content_block_delta`).
    pub delta: Option<StreamDelta>,
    /// Message metadata (for `message_start`).
    pub message: Option<StreamMessage>,
    /// Usage info (for `message_delta`).
    pub usage: Option<ResponseUsage>,
}

/// Content block within a `content_block_start` event.
#[derive(Debug, Deserialize)]
pub(crate) struct StreamContentBlock {
    pub text: Option<String>,
}

/// Delta content within a `content_block_delta` event.
#[derive(Debug, Deserialize)]
pub(crate) struct StreamDelta {
    pub text: Option<String>,
}

/// Message metadata from `message_start` events.
#[derive(Debug, Deserialize)]
pub(crate) struct StreamMessage {
    pub usage: Option<ResponseUsage>,
}

/// Token usage as reported on the stream.
///
/// Field names match the API exactly.
#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
pub(crate) struct ResponseUsage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
}
