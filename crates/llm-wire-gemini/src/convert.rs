//! Conversion from core conversation types to the GenerateContent
//! request shape.

use llm_wire::chat::{Message as CoreMessage, Role};
use serde_json::{Map, Value};

use crate::types::{Content, Part, Request, SafetySetting};

/// The fixed safety block attached to every request. The host
/// application moderates its own conversations; provider-side blocking
/// of an interactive session is disabled.
fn safety_settings() -> Vec<SafetySetting> {
    const CATEGORIES: [&str; 4] = [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ];
    CATEGORIES
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: "BLOCK_NONE",
        })
        .collect()
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        // This API has no system role; instructions ride as user turns.
        Role::System | Role::User => "user",
    }
}

/// Builds a GenerateContent request body.
///
/// Every message's content is wrapped as a one-element parts array,
/// then runs of consecutive same-role entries merge into a single
/// entry whose parts concatenate in original order.
pub fn build_request<'a>(messages: &[CoreMessage], resolved: &'a Map<String, Value>) -> Request<'a> {
    let mut contents: Vec<Content> = Vec::new();
    for message in messages {
        let role = role_name(message.role);
        let part = Part {
            text: message.content.clone(),
        };
        match contents.last_mut() {
            Some(last) if last.role == role => last.parts.push(part),
            _ => contents.push(Content {
                role,
                parts: vec![part],
            }),
        }
    }

    Request {
        contents,
        generation_config: (!resolved.is_empty()).then_some(resolved),
        safety_settings: safety_settings(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roles_renamed() {
        let messages = vec![
            CoreMessage::user("q"),
            CoreMessage::assistant("a"),
        ];
        let resolved = Map::new();
        let req = build_request(&messages, &resolved);
        assert_eq!(req.contents[0].role, "user");
        assert_eq!(req.contents[1].role, "model");
    }

    #[test]
    fn test_system_becomes_user() {
        let messages = vec![CoreMessage::system("Be terse."), CoreMessage::user("Hi")];
        let resolved = Map::new();
        let req = build_request(&messages, &resolved);
        // Renamed to the same role, so the two turns merge.
        assert_eq!(req.contents.len(), 1);
        assert_eq!(req.contents[0].role, "user");
        assert_eq!(req.contents[0].parts.len(), 2);
        assert_eq!(req.contents[0].parts[0].text, "Be terse.");
        assert_eq!(req.contents[0].parts[1].text, "Hi");
    }

    #[test]
    fn test_consecutive_same_role_merged_in_order() {
        let messages = vec![
            CoreMessage::user("one"),
            CoreMessage::user("two"),
            CoreMessage::assistant("three"),
            CoreMessage::assistant("four"),
            CoreMessage::user("five"),
        ];
        let resolved = Map::new();
        let req = build_request(&messages, &resolved);
        assert_eq!(req.contents.len(), 3);
        assert_eq!(req.contents[0].parts[0].text, "one");
        assert_eq!(req.contents[0].parts[1].text, "two");
        assert_eq!(req.contents[1].role, "model");
        assert_eq!(req.contents[1].parts[1].text, "four");
        assert_eq!(req.contents[2].parts[0].text, "five");
    }

    #[test]
    fn test_single_message_single_part() {
        let resolved = Map::new();
        let req = build_request(&[CoreMessage::user("Hello")], &resolved);
        assert_eq!(req.contents.len(), 1);
        assert_eq!(req.contents[0].parts.len(), 1);
    }

    #[test]
    fn test_generation_config_nested() {
        let mut resolved = Map::new();
        resolved.insert("topP".into(), json!(0.9));
        resolved.insert("maxOutputTokens".into(), json!(2048));
        let req = build_request(&[CoreMessage::user("Hi")], &resolved);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["generationConfig"]["topP"], 0.9);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        // Nothing leaks to the top level.
        assert!(json.get("topP").is_none());
    }

    #[test]
    fn test_safety_settings_always_attached() {
        let resolved = Map::new();
        let req = build_request(&[CoreMessage::user("Hi")], &resolved);
        assert_eq!(req.safety_settings.len(), 4);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json["safetySettings"][0]["category"],
            "HARM_CATEGORY_HARASSMENT"
        );
    }

    #[test]
    fn test_empty_conversation() {
        let resolved = Map::new();
        let req = build_request(&[], &resolved);
        assert!(req.contents.is_empty());
    }
}
