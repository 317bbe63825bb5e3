//! Conversation messages and roles.
//!
//! A [`Message`] is one turn of the normalized conversation handed to
//! the payload builders. The conversation itself is produced elsewhere
//! (by the document parser of the host application); this crate only
//! reads it.

use serde::{Deserialize, Serialize};

/// The author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// The human side of the exchange.
    User,
    /// The model side of the exchange.
    Assistant,
}

/// Prompt-caching annotation on a message.
///
/// Providers that support prompt caching accept this marker on
/// individual content blocks; providers without a cache tier ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CacheControl {
    /// Cache this prefix with the provider's default time-to-live.
    Ephemeral,
}

/// One turn of the normalized conversation.
///
/// Owned by the caller; payload builders only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored this turn.
    pub role: Role,
    /// The turn's text content.
    pub content: String,
    /// Optional prompt-caching annotation, preserved by builders that
    /// understand it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    /// Paths of files the host application attached to this turn.
    /// Carried for diagnostics; not part of any wire payload.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_references: Vec<String>,
}

impl Message {
    /// Creates a message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            cache_control: None,
            file_references: Vec::new(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Marks this message as a cacheable prefix.
    #[must_use]
    pub fn cached(mut self) -> Self {
        self.cache_control = Some(CacheControl::Ephemeral);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
    }

    #[test]
    fn test_message_constructors() {
        let m = Message::user("hello");
        assert_eq!(m.role, Role::User);
        assert_eq!(m.content, "hello");
        assert!(m.cache_control.is_none());
        assert!(m.file_references.is_empty());

        assert_eq!(Message::assistant("hi").role, Role::Assistant);
        assert_eq!(Message::system("rules").role, Role::System);
    }

    #[test]
    fn test_message_cached() {
        let m = Message::system("rules").cached();
        assert_eq!(m.cache_control, Some(CacheControl::Ephemeral));
    }

    #[test]
    fn test_cache_control_serialization() {
        let json = serde_json::to_value(CacheControl::Ephemeral).unwrap();
        assert_eq!(json, serde_json::json!({"type": "ephemeral"}));
    }

    #[test]
    fn test_message_serde_roundtrip() {
        let m = Message {
            role: Role::User,
            content: "look at this".into(),
            cache_control: None,
            file_references: vec!["notes/todo.md".into()],
        };
        let json = serde_json::to_string(&m).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }

    #[test]
    fn test_message_deserialize_without_optional_fields() {
        let m: Message =
            serde_json::from_str(r#"{"role": "assistant", "content": "ok"}"#).unwrap();
        assert_eq!(m.role, Role::Assistant);
        assert!(m.cache_control.is_none());
        assert!(m.file_references.is_empty());
    }
}
