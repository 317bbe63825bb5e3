//! The credential store seam.
//!
//! Secrets live outside this workspace (keychains, encrypted files,
//! agent prompts); the orchestrator only needs a way to ask for one.
//! Resolution may be asynchronous. A store that already holds the
//! secret returns a ready future, which the dispatcher awaits like any
//! other, so synchronous and asynchronous stores take the same path
//! and neither can double-resolve an exchange.

use std::future::Future;
use std::pin::Pin;

use llm_wire::provider::ProviderKind;

/// Resolves API secrets per provider family.
pub trait CredentialStore: Send + Sync {
    /// Resolves a usable secret for `provider`, or `None` when no
    /// credential is available.
    fn secret<'a>(
        &'a self,
        provider: ProviderKind,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
}

/// Reads secrets from conventional environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    /// The environment variable consulted for a provider family.
    pub fn var_name(provider: ProviderKind) -> &'static str {
        match provider {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl CredentialStore for EnvCredentials {
    fn secret<'a>(
        &'a self,
        provider: ProviderKind,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let value = std::env::var(Self::var_name(provider))
            .ok()
            .filter(|v| !v.is_empty());
        Box::pin(std::future::ready(value))
    }
}
