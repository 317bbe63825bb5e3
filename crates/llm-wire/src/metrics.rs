//! Token usage accounting and the shared usage slot.
//!
//! [`Usage`] records what the most recently completed exchange reported:
//! prompt tokens, completion tokens, and the cache creation/read split
//! for providers with a prompt-cache tier. Every field is optional; a
//! provider that never reports usage leaves the fields `None` (not
//! zero), which the UI renders as "unknown" rather than "free".
//!
//! [`UsageSlot`] is the single process-wide cell those numbers live in.
//! Extractors write through it per line as usage blocks arrive, and
//! concurrent exchanges racing to finish simply overwrite each other
//! (last writer wins). That is intentional: only one exchange is
//! normally user-visible at a time, and callers expect one global
//! snapshot, not per-exchange isolation.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Token counts reported by the most recent exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt.
    pub input_tokens: Option<u64>,
    /// Tokens produced by the model's response.
    pub output_tokens: Option<u64>,
    /// Tokens written into the provider's prompt cache. `Some(0)` means
    /// the provider has a cache tier but nothing was written; `None`
    /// means no usage was reported at all.
    pub cache_write_tokens: Option<u64>,
    /// Tokens served from the provider's prompt cache.
    pub cache_read_tokens: Option<u64>,
}

impl Usage {
    /// Returns `true` if no field has been reported.
    pub fn is_empty(&self) -> bool {
        self.input_tokens.is_none()
            && self.output_tokens.is_none()
            && self.cache_write_tokens.is_none()
            && self.cache_read_tokens.is_none()
    }
}

/// The process-wide usage cell.
///
/// Cloning the slot clones the handle, not the value; all clones share
/// one underlying [`Usage`]. Reads get a defensive copy via
/// [`snapshot`](Self::snapshot).
#[derive(Debug, Clone, Default)]
pub struct UsageSlot {
    inner: Arc<Mutex<Usage>>,
}

impl UsageSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current usage.
    pub fn snapshot(&self) -> Usage {
        *self.inner.lock().expect("usage slot lock poisoned")
    }

    /// Runs `f` with mutable access to the shared usage.
    pub fn update<R>(&self, f: impl FnOnce(&mut Usage) -> R) -> R {
        let mut guard = self.inner.lock().expect("usage slot lock poisoned");
        f(&mut guard)
    }

    /// Overwrites the slot wholesale.
    pub fn replace(&self, usage: Usage) {
        *self.inner.lock().expect("usage slot lock poisoned") = usage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_default_is_empty() {
        assert!(Usage::default().is_empty());
    }

    #[test]
    fn test_usage_some_zero_is_not_empty() {
        let u = Usage {
            cache_write_tokens: Some(0),
            ..Default::default()
        };
        assert!(!u.is_empty());
    }

    #[test]
    fn test_slot_snapshot_is_a_copy() {
        let slot = UsageSlot::new();
        slot.replace(Usage {
            input_tokens: Some(10),
            ..Default::default()
        });
        let snap = slot.snapshot();
        slot.replace(Usage::default());
        // The earlier snapshot is unaffected by the later write.
        assert_eq!(snap.input_tokens, Some(10));
        assert!(slot.snapshot().is_empty());
    }

    #[test]
    fn test_slot_clones_share_state() {
        let slot = UsageSlot::new();
        let other = slot.clone();
        other.update(|u| u.output_tokens = Some(7));
        assert_eq!(slot.snapshot().output_tokens, Some(7));
    }

    #[test]
    fn test_slot_last_writer_wins() {
        let slot = UsageSlot::new();
        slot.replace(Usage {
            input_tokens: Some(100),
            cache_read_tokens: Some(40),
            ..Default::default()
        });
        slot.replace(Usage {
            input_tokens: Some(5),
            ..Default::default()
        });
        let snap = slot.snapshot();
        assert_eq!(snap.input_tokens, Some(5));
        // Wholesale overwrite: the earlier cache figure does not survive.
        assert_eq!(snap.cache_read_tokens, None);
    }

    #[test]
    fn test_usage_serde_roundtrip() {
        let u = Usage {
            input_tokens: Some(42),
            output_tokens: Some(7),
            cache_write_tokens: Some(0),
            cache_read_tokens: None,
        };
        let json = serde_json::to_string(&u).unwrap();
        let back: Usage = serde_json::from_str(&json).unwrap();
        assert_eq!(u, back);
    }
}
