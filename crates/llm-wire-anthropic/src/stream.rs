//! Per-line content and usage extraction for the Messages-API event
//! stream.
//!
//! Each call handles one trimmed line (the `data: ` payload of one
//! event). Malformed input never raises; it yields empty text and
//! leaves the usage slot untouched.
//!
//! Usage arrives in two places: `message_start` carries the prompt
//! figures (input tokens plus the cache creation/read split), and
//! `message_delta` carries the running output count. A block with
//! prompt figures commits all three cache-accounting fields, with
//! absent ones recorded as zero (meaning "cache tier present, nothing
//! cached") rather than left null. An exchange that never reports
//! usage leaves every field null.

use llm_wire::metrics::Usage;

use crate::types::{ResponseUsage, StreamResponse};

/// Extracts the content delta from one line of stream syntax, writing
/// any usage figures through to `usage`.
pub fn extract_line(line: &str, usage: &mut Usage) -> String {
    let data = line.strip_prefix("data: ").unwrap_or(line);
    if data == "[DONE]" {
        return String::new();
    }

    let Ok(event) = serde_json::from_str::<StreamResponse>(data) else {
        return String::new();
    };

    if let Some(reported) = event.message.as_ref().and_then(|m| m.usage.as_ref()) {
        commit_usage(reported, usage);
    }
    if let Some(reported) = &event.usage {
        commit_usage(reported, usage);
    }

    match event.event_type.as_str() {
        "content_block_start" => event
            .content_block
            .and_then(|block| block.text)
            .unwrap_or_default(),
        "content_block_delta" => event
            .delta
            .and_then(|delta| delta.text)
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn commit_usage(reported: &ResponseUsage, usage: &mut Usage) {
    if reported.input_tokens.is_some() {
        usage.input_tokens = reported.input_tokens;
        usage.cache_write_tokens = Some(reported.cache_creation_input_tokens.unwrap_or(0));
        usage.cache_read_tokens = Some(reported.cache_read_input_tokens.unwrap_or(0));
    }
    if reported.output_tokens.is_some() {
        usage.output_tokens = reported.output_tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_block_delta() {
        let mut usage = Usage::default();
        let line = r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#;
        assert_eq!(extract_line(line, &mut usage), "Hello");
        assert!(usage.is_empty());
    }

    #[test]
    fn test_extract_block_start_text() {
        let mut usage = Usage::default();
        let line = r#"data: {"type":"content_block_start","index":0,"content_block":{"type":"text","text":"Lead-in"}}"#;
        assert_eq!(extract_line(line, &mut usage), "Lead-in");
    }

    #[test]
    fn test_empty_block_start() {
        let mut usage = Usage::default();
        let line = r#"data: {"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#;
        assert_eq!(extract_line(line, &mut usage), "");
    }

    #[test]
    fn test_message_start_usage() {
        let mut usage = Usage::default();
        let line = r#"data: {"type":"message_start","message":{"usage":{"input_tokens":42,"output_tokens":0,"cache_creation_input_tokens":20,"cache_read_input_tokens":10}}}"#;
        assert_eq!(extract_line(line, &mut usage), "");
        assert_eq!(usage.input_tokens, Some(42));
        assert_eq!(usage.cache_write_tokens, Some(20));
        assert_eq!(usage.cache_read_tokens, Some(10));
    }

    #[test]
    fn test_usage_absent_cache_fields_default_to_zero() {
        let mut usage = Usage::default();
        let line = r#"data: {"type":"message_start","message":{"usage":{"input_tokens":42,"output_tokens":0}}}"#;
        extract_line(line, &mut usage);
        // A cache tier exists for this family; absent figures mean
        // "nothing cached", not "unknown".
        assert_eq!(usage.cache_write_tokens, Some(0));
        assert_eq!(usage.cache_read_tokens, Some(0));
    }

    #[test]
    fn test_no_usage_block_leaves_fields_null() {
        let mut usage = Usage::default();
        let line = r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#;
        extract_line(line, &mut usage);
        assert!(usage.is_empty());
    }

    #[test]
    fn test_message_delta_output_does_not_wipe_prompt_figures() {
        let mut usage = Usage::default();
        let start = r#"data: {"type":"message_start","message":{"usage":{"input_tokens":42,"cache_read_input_tokens":10}}}"#;
        extract_line(start, &mut usage);
        let delta = r#"data: {"type":"message_delta","delta":{"stop_reason":"end_turn"},"usage":{"output_tokens":15}}"#;
        extract_line(delta, &mut usage);

        assert_eq!(usage.input_tokens, Some(42));
        assert_eq!(usage.cache_read_tokens, Some(10));
        assert_eq!(usage.output_tokens, Some(15));
    }

    #[test]
    fn test_ping_ignored() {
        let mut usage = Usage::default();
        assert_eq!(extract_line(r#"data: {"type":"ping"}"#, &mut usage), "");
    }

    #[test]
    fn test_done_sentinel() {
        let mut usage = Usage::default();
        assert_eq!(extract_line("data: [DONE]", &mut usage), "");
    }

    #[test]
    fn test_malformed_line_is_silent() {
        let mut usage = Usage::default();
        assert_eq!(extract_line(r#"data: {"type":"#, &mut usage), "");
        assert_eq!(extract_line("event: content_block_delta", &mut usage), "");
        assert!(usage.is_empty());
    }

    // ── Provider isolation ──────────────────────────────────────────

    #[test]
    fn test_openai_shaped_line_yields_nothing() {
        let mut usage = Usage::default();
        let line = r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#;
        assert_eq!(extract_line(line, &mut usage), "");
        assert!(usage.is_empty());
    }

    #[test]
    fn test_gemini_shaped_line_yields_nothing() {
        let mut usage = Usage::default();
        let line = r#"data: {"candidates":[{"content":{"parts":[{"text":"Hi"}]}}]}"#;
        assert_eq!(extract_line(line, &mut usage), "");
        assert!(usage.is_empty());
    }
}
