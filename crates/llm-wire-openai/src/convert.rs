//! Conversion from core conversation types to the chat-completions
//! request shape.

use llm_wire::chat::{Message as CoreMessage, Role};
use serde_json::{Map, Value};

use crate::types::{Message, Request, StreamOptions};

/// Parameter keys a reasoning model rejects. They are dropped from the
/// resolved map even when a caller's configuration smuggled them in.
const REASONING_REJECTED: [&str; 4] = [
    "temperature",
    "top_p",
    "max_tokens",
    "max_completion_tokens",
];

/// Detects the reasoning model subclass by identifier pattern.
pub fn is_reasoning_model(model: &str) -> bool {
    ["gpt-5", "o1", "o3", "o4"]
        .iter()
        .any(|prefix| model.starts_with(prefix))
}

/// Builds a chat-completions request body.
///
/// Resolved parameters are merged at the top level and the streaming
/// usage flag is always set. For reasoning models, system messages are
/// removed from the conversation (the API rejects them) and sampling
/// and length controls are proactively dropped from the parameter map.
pub fn build_request<'a>(
    model: &'a str,
    messages: &'a [CoreMessage],
    resolved: &Map<String, Value>,
) -> Request<'a> {
    let reasoning = is_reasoning_model(model);

    let messages = messages
        .iter()
        .filter(|m| !(reasoning && m.role == Role::System))
        .map(|m| Message {
            role: role_name(m.role),
            content: &m.content,
        })
        .collect();

    let mut params = resolved.clone();
    if reasoning {
        for key in REASONING_REJECTED {
            params.remove(key);
        }
    }

    Request {
        model,
        messages,
        stream: true,
        stream_options: StreamOptions {
            include_usage: true,
        },
        params,
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_is_reasoning_model() {
        assert!(is_reasoning_model("gpt-5"));
        assert!(is_reasoning_model("gpt-5-mini"));
        assert!(is_reasoning_model("o3"));
        assert!(is_reasoning_model("o4-mini"));
        assert!(is_reasoning_model("o1-preview"));
        assert!(!is_reasoning_model("gpt-4o"));
        assert!(!is_reasoning_model("gpt-4.1"));
    }

    #[test]
    fn test_build_request_basic() {
        let messages = vec![
            CoreMessage::system("You are terse."),
            CoreMessage::user("Hello"),
        ];
        let req = build_request("gpt-4o", &messages, &params(&[("temperature", json!(0.7))]));

        assert_eq!(req.model, "gpt-4o");
        assert!(req.stream);
        assert!(req.stream_options.include_usage);
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, "system");
        assert_eq!(req.messages[1].role, "user");
        assert_eq!(req.params["temperature"], json!(0.7));
    }

    #[test]
    fn test_role_names() {
        let messages = vec![
            CoreMessage::user("q"),
            CoreMessage::assistant("a"),
            CoreMessage::user("q2"),
        ];
        let req = build_request("gpt-4o", &messages, &Map::new());
        assert_eq!(req.messages[1].role, "assistant");
    }

    #[test]
    fn test_reasoning_strips_system_messages() {
        let messages = vec![
            CoreMessage::system("You are terse."),
            CoreMessage::user("Hello"),
            CoreMessage::system("Another instruction"),
        ];
        let req = build_request("gpt-5", &messages, &Map::new());
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, "user");
    }

    #[test]
    fn test_reasoning_drops_sampling_params() {
        let resolved = params(&[
            ("temperature", json!(0.7)),
            ("top_p", json!(0.9)),
            ("max_tokens", json!(512)),
            ("max_completion_tokens", json!(512)),
            ("reasoning_effort", json!("high")),
        ]);
        let msgs = [CoreMessage::user("hi")];
        let req = build_request("o3", &msgs, &resolved);
        assert!(!req.params.contains_key("temperature"));
        assert!(!req.params.contains_key("top_p"));
        assert!(!req.params.contains_key("max_tokens"));
        assert!(!req.params.contains_key("max_completion_tokens"));
        assert_eq!(req.params["reasoning_effort"], json!("high"));
    }

    #[test]
    fn test_non_reasoning_keeps_params() {
        let resolved = params(&[("temperature", json!(0.7)), ("max_tokens", json!(512))]);
        let msgs = [CoreMessage::user("hi")];
        let req = build_request("gpt-4o", &msgs, &resolved);
        assert_eq!(req.params.len(), 2);
    }

    #[test]
    fn test_empty_resolved_params() {
        let msgs = [CoreMessage::user("hi")];
        let req = build_request("gpt-4o", &msgs, &Map::new());
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["stream"], true);
    }
}
