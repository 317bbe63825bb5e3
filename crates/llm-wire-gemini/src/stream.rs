//! Per-line content and usage extraction for the GenerateContent
//! stream syntax.
//!
//! With `alt=sse` each `data: ` line is a complete JSON object and the
//! candidates path applies. Without it the response is a pretty-printed
//! JSON array delivered line by line, so whole-object parsing fails;
//! for those fragments a bare `"text": "…"` match anywhere in the line
//! recovers the content without requiring full object parsing.
//! Malformed input never raises; it yields empty text and leaves the
//! usage slot untouched.

use std::sync::LazyLock;

use llm_wire::metrics::Usage;
use regex::Regex;

use crate::types::{StreamChunk, UsageMetadata};

static TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""text"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid regex"));

/// Extracts the content delta from one line of stream syntax, writing
/// any usage figures through to `usage`.
pub fn extract_line(line: &str, usage: &mut Usage) -> String {
    let data = line.strip_prefix("data: ").unwrap_or(line);
    if data == "[DONE]" {
        return String::new();
    }

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => {
            if let Some(metadata) = &chunk.usage_metadata {
                commit_usage(metadata, usage);
            }
            chunk
                .candidates
                .into_iter()
                .next()
                .and_then(|candidate| candidate.content)
                .map(|content| {
                    content
                        .parts
                        .into_iter()
                        .filter_map(|part| part.text)
                        .collect()
                })
                .unwrap_or_default()
        }
        Err(_) => bare_text(data),
    }
}

/// This family has no cache tier, so both cache fields are forced to
/// zero whenever usage is reported.
fn commit_usage(metadata: &UsageMetadata, usage: &mut Usage) {
    *usage = Usage {
        input_tokens: metadata.prompt_token_count,
        output_tokens: metadata.candidates_token_count,
        cache_write_tokens: Some(0),
        cache_read_tokens: Some(0),
    };
}

/// Recovers the value of a bare `"text"` key from a JSON fragment.
fn bare_text(fragment: &str) -> String {
    let Some(captures) = TEXT_RE.captures(fragment) else {
        return String::new();
    };
    let escaped = &captures[1];
    // The capture still carries JSON escapes; decode it as a string
    // literal, falling back to the raw capture for odd input.
    serde_json::from_str::<String>(&format!("\"{escaped}\""))
        .unwrap_or_else(|_| escaped.to_string())
}
