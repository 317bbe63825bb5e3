//! Enum dispatch over the provider family crates.
//!
//! Each family crate knows one wire shape; this module is the single
//! place where a [`ProviderKind`] value selects among them.

use http::HeaderMap;
use llm_wire::chat::Message;
use llm_wire::error::WireError;
use llm_wire::metrics::Usage;
use llm_wire::provider::ProviderKind;
use llm_wire::session::SessionFlags;
use serde_json::{Map, Value};

use crate::client::ClientConfig;

/// Builds the provider-shaped request body.
pub(crate) fn build_payload(
    kind: ProviderKind,
    model: &str,
    messages: &[Message],
    resolved: &Map<String, Value>,
    flags: &SessionFlags,
) -> Value {
    match kind {
        ProviderKind::OpenAi => {
            serde_json::to_value(llm_wire_openai::build_request(model, messages, resolved))
                .expect("payload serializes")
        }
        ProviderKind::Anthropic => serde_json::to_value(llm_wire_anthropic::build_request(
            model, messages, resolved, flags,
        ))
        .expect("payload serializes"),
        ProviderKind::Gemini => {
            serde_json::to_value(llm_wire_gemini::build_request(messages, resolved))
                .expect("payload serializes")
        }
    }
}

/// The streaming endpoint for a family and model.
pub(crate) fn endpoint_url(kind: ProviderKind, config: &ClientConfig, model: &str) -> String {
    match kind {
        ProviderKind::OpenAi => llm_wire_openai::endpoint_url(&config.openai_base_url, model),
        ProviderKind::Anthropic => {
            llm_wire_anthropic::endpoint_url(&config.anthropic_base_url, model)
        }
        ProviderKind::Gemini => llm_wire_gemini::endpoint_url(&config.gemini_base_url, model),
    }
}

/// Authenticated request headers for a family.
pub(crate) fn request_headers(kind: ProviderKind, secret: &str) -> Result<HeaderMap, WireError> {
    match kind {
        ProviderKind::OpenAi => llm_wire_openai::request_headers(secret),
        ProviderKind::Anthropic => llm_wire_anthropic::request_headers(secret),
        ProviderKind::Gemini => llm_wire_gemini::request_headers(secret),
    }
}

/// Per-line extraction under a family's stream syntax.
pub(crate) fn extract_line(kind: ProviderKind, line: &str, usage: &mut Usage) -> String {
    match kind {
        ProviderKind::OpenAi => llm_wire_openai::extract_line(line, usage),
        ProviderKind::Anthropic => llm_wire_anthropic::extract_line(line, usage),
        ProviderKind::Gemini => llm_wire_gemini::extract_line(line, usage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shapes_differ_per_family() {
        let messages = vec![Message::system("rules"), Message::user("hi")];
        let resolved = Map::new();
        let flags = SessionFlags::new();

        let openai = build_payload(ProviderKind::OpenAi, "gpt-4o", &messages, &resolved, &flags);
        let anthropic = build_payload(
            ProviderKind::Anthropic,
            "claude-sonnet-4-5-20250929",
            &messages,
            &resolved,
            &flags,
        );
        let gemini = build_payload(
            ProviderKind::Gemini,
            "gemini-2.5-flash",
            &messages,
            &resolved,
            &flags,
        );

        // Flat chat shape keeps system in the message list.
        assert_eq!(openai["messages"][0]["role"], "system");
        // Separate system channel.
        assert_eq!(anthropic["system"][0]["text"], "rules");
        assert_eq!(anthropic["messages"][0]["role"], "user");
        // Renamed and merged under a different key.
        assert!(gemini.get("messages").is_none());
        assert_eq!(gemini["contents"][0]["parts"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_extract_line_isolation_across_kinds() {
        let openai_line = r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#;
        let mut usage = Usage::default();
        assert_eq!(
            extract_line(ProviderKind::OpenAi, openai_line, &mut usage),
            "Hi"
        );
        assert_eq!(
            extract_line(ProviderKind::Anthropic, openai_line, &mut usage),
            ""
        );
        assert_eq!(extract_line(ProviderKind::Gemini, openai_line, &mut usage), "");
    }

    #[test]
    fn test_endpoint_url_per_family() {
        let config = ClientConfig::default();
        assert!(endpoint_url(ProviderKind::OpenAi, &config, "gpt-4o").contains("chat/completions"));
        assert!(endpoint_url(ProviderKind::Anthropic, &config, "m").contains("/v1/messages"));
        assert!(
            endpoint_url(ProviderKind::Gemini, &config, "gemini-2.5-flash")
                .contains("gemini-2.5-flash:streamGenerateContent")
        );
    }

    #[test]
    fn test_request_headers_per_family() {
        assert!(
            request_headers(ProviderKind::OpenAi, "k")
                .unwrap()
                .contains_key("authorization")
        );
        assert!(
            request_headers(ProviderKind::Anthropic, "k")
                .unwrap()
                .contains_key("x-api-key")
        );
        assert!(
            request_headers(ProviderKind::Gemini, "k")
                .unwrap()
                .contains_key("x-goog-api-key")
        );
    }
}
