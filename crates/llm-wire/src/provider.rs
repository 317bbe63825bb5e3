//! The closed set of provider wire-protocol families.
//!
//! Dispatch over providers is a match on [`ProviderKind`], not a chain
//! of string comparisons. The set is closed on purpose: each variant
//! corresponds to a structurally distinct wire shape (flat
//! chat-completions, separate system channel, role-renamed merged
//! content), and the payload builders and line extractors in the
//! sibling crates are each written against exactly one of them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the wire-protocol families this workspace speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Chat-completions style: flat parameter map plus a `messages` array.
    OpenAi,
    /// Messages-API style: system prompt travels in a dedicated channel.
    Anthropic,
    /// GenerateContent style: renamed roles, merged `contents` with parts.
    Gemini,
}

impl ProviderKind {
    /// The lowercase identifier used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    /// All known families, in display order.
    pub fn all() -> [Self; 3] {
        [Self::OpenAi, Self::Anthropic, Self::Gemini]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Returned when a provider identifier does not name a known family.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider '{0}'")]
pub struct UnknownProvider(pub String);

/// Rewrites a bare model identifier to its pinned, dated variant.
///
/// Unmatched identifiers pass through unchanged. The table is exact
/// match only; family-wide targeting belongs to the schema override
/// rules in [`params`](crate::params).
pub fn pinned_model(model: &str) -> &str {
    match model {
        "claude-sonnet-4-5" => "claude-sonnet-4-5-20250929",
        "claude-opus-4-1" => "claude-opus-4-1-20250805",
        "claude-haiku-4-5" => "claude-haiku-4-5-20251001",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_roundtrip() {
        for kind in ProviderKind::all() {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(
            "Anthropic".parse::<ProviderKind>().unwrap(),
            ProviderKind::Anthropic
        );
    }

    #[test]
    fn test_from_str_google_alias() {
        assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
    }

    #[test]
    fn test_from_str_unknown() {
        let err = "mystery".parse::<ProviderKind>().unwrap_err();
        assert_eq!(err, UnknownProvider("mystery".into()));
        assert!(format!("{err}").contains("mystery"));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&ProviderKind::OpenAi).unwrap(),
            "\"openai\""
        );
        let kind: ProviderKind = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(kind, ProviderKind::Gemini);
    }

    #[test]
    fn test_pinned_model_rewrites_known() {
        assert_eq!(pinned_model("claude-sonnet-4-5"), "claude-sonnet-4-5-20250929");
        assert_eq!(pinned_model("claude-opus-4-1"), "claude-opus-4-1-20250805");
    }

    #[test]
    fn test_pinned_model_passthrough() {
        assert_eq!(pinned_model("gpt-4o"), "gpt-4o");
        assert_eq!(
            pinned_model("claude-sonnet-4-5-20250929"),
            "claude-sonnet-4-5-20250929"
        );
    }
}
