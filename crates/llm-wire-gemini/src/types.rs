//! GenerateContent request and response types.
//!
//! These types mirror the wire format and are not part of the public
//! vocabulary. Conversion from core types happens in
//! [`convert`](crate::convert).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Request types ──────────────────────────────────────────────────

/// Top-level request body for `POST …:streamGenerateContent`.
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    /// The merged conversation. Note the key: this API calls the
    /// message array `contents`.
    pub contents: Vec<Content>,
    /// Resolved tuning parameters, nested rather than top-level.
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<&'a Map<String, Value>>,
    /// Fixed safety block attached to every request.
    #[serde(rename = "safetySettings")]
    pub safety_settings: Vec<SafetySetting>,
}

/// One merged conversation entry.
#[derive(Debug, Serialize)]
pub struct Content {
    /// Wire role name (`user` or `model`).
    pub role: &'static str,
    /// The entry's text parts, in original order.
    pub parts: Vec<Part>,
}

/// A single text part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// The part text.
    pub text: String,
}

/// One safety-settings entry.
#[derive(Debug, Clone, Serialize)]
pub struct SafetySetting {
    /// Harm category identifier.
    pub category: &'static str,
    /// Blocking threshold for that category.
    pub threshold: &'static str,
}

// ── Streaming types ────────────────────────────────────────────────

/// One parsed line of the streaming response.
#[derive(Debug, Deserialize)]
pub(crate) struct StreamChunk {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    pub usage_metadata: Option<UsageMetadata>,
}

/// One response candidate.
#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<CandidateContent>,
}

/// The content of a candidate.
#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<StreamPart>,
}

/// A text part within a streamed candidate.
#[derive(Debug, Deserialize)]
pub(crate) struct StreamPart {
    pub text: Option<String>,
}

/// Token accounting as reported on the stream.
#[derive(Debug, Deserialize)]
pub(crate) struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    pub prompt_token_count: Option<u64>,
    #[serde(rename = "candidatesTokenCount")]
    pub candidates_token_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let mut config = Map::new();
        config.insert("temperature".into(), json!(0.7));
        let req = Request {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: "Hello".into(),
                }],
            }],
            generation_config: Some(&config),
            safety_settings: vec![SafetySetting {
                category: "HARM_CATEGORY_HARASSMENT",
                threshold: "BLOCK_NONE",
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(json["generationConfig"]["temperature"], 0.7);
        assert_eq!(json["safetySettings"][0]["threshold"], "BLOCK_NONE");
        // The flat chat key does not exist in this shape.
        assert!(json.get("messages").is_none());
    }

    #[test]
    fn test_request_omits_empty_generation_config() {
        let req = Request {
            contents: vec![],
            generation_config: None,
            safety_settings: vec![],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_stream_chunk_deserialization() {
        let chunk: StreamChunk = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hi"}],"role":"model"}}],"usageMetadata":{"promptTokenCount":8,"candidatesTokenCount":3}}"#,
        )
        .unwrap();
        assert_eq!(chunk.candidates.len(), 1);
        let usage = chunk.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, Some(8));
        assert_eq!(usage.candidates_token_count, Some(3));
    }

    #[test]
    fn test_stream_chunk_without_candidates() {
        let chunk: StreamChunk =
            serde_json::from_str(r#"{"usageMetadata":{"promptTokenCount":8}}"#).unwrap();
        assert!(chunk.candidates.is_empty());
    }
}
