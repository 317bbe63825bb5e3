//! Shared session feature flags.
//!
//! Some payload decisions depend on session-wide state the user toggles
//! at runtime rather than on per-agent configuration. The flags live in
//! one shared value (typically behind an `Arc`) that both the host
//! application and the payload builders read.

use std::sync::atomic::{AtomicBool, Ordering};

/// Runtime feature toggles shared across the session.
#[derive(Debug, Default)]
pub struct SessionFlags {
    server_tools: AtomicBool,
}

impl SessionFlags {
    /// Creates flags with everything disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether provider-hosted tools are offered on outgoing requests.
    pub fn server_tools(&self) -> bool {
        self.server_tools.load(Ordering::Relaxed)
    }

    /// Enables or disables provider-hosted tools.
    pub fn set_server_tools(&self, enabled: bool) {
        self.server_tools.store(enabled, Ordering::Relaxed);
    }
}
