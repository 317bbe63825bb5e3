//! Per-line content and usage extraction for the chat-completions
//! stream syntax.
//!
//! Each call handles one trimmed line. Malformed input never raises;
//! it yields empty text and leaves the usage slot untouched, because a
//! single bad line must not abort an otherwise-healthy stream. The one
//! exception is the best-effort fallback: when a line fails to parse
//! but still mentions token counts, the counts are pulled out textually
//! so that truncated final chunks do not lose the accounting.

use std::sync::LazyLock;

use llm_wire::metrics::Usage;
use regex::Regex;

use crate::types::{ResponseUsage, StreamChunk};

static PROMPT_TOKENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""?prompt_tokens"?\s*[:=]\s*(\d+)"#).expect("valid regex"));

static CACHED_TOKENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""?cached_tokens"?\s*[:=]\s*(\d+)"#).expect("valid regex"));

/// Extracts the content delta from one line of stream syntax, writing
/// any usage figures through to `usage`.
pub fn extract_line(line: &str, usage: &mut Usage) -> String {
    let data = line.strip_prefix("data: ").unwrap_or(line);
    if data == "[DONE]" {
        return String::new();
    }

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => {
            if let Some(u) = &chunk.usage {
                if u.prompt_tokens.is_some() || u.completion_tokens.is_some() {
                    commit_usage(u, usage);
                }
            }
            chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta)
                .and_then(|delta| delta.content)
                .unwrap_or_default()
        }
        Err(_) => {
            fallback_usage(data, usage);
            String::new()
        }
    }
}

/// Overwrites the slot from a parsed usage block. This family has no
/// cache-creation tier, so that field is cleared rather than left from
/// a previous exchange.
fn commit_usage(reported: &ResponseUsage, usage: &mut Usage) {
    *usage = Usage {
        input_tokens: reported.prompt_tokens,
        output_tokens: reported.completion_tokens,
        cache_write_tokens: None,
        cache_read_tokens: reported
            .prompt_tokens_details
            .as_ref()
            .and_then(|d| d.cached_tokens),
    };
}

/// Pulls token counts out of text that failed JSON parsing. Tolerates
/// loose quoting and `key = value` shapes; anything it cannot find is
/// simply absent.
fn fallback_usage(text: &str, usage: &mut Usage) {
    let prompt = PROMPT_TOKENS_RE
        .captures(text)
        .and_then(|c| c[1].parse().ok());
    let cached = CACHED_TOKENS_RE
        .captures(text)
        .and_then(|c| c[1].parse().ok());
    if prompt.is_some() || cached.is_some() {
        *usage = Usage {
            input_tokens: prompt,
            output_tokens: None,
            cache_write_tokens: None,
            cache_read_tokens: cached,
        };
    }
}
