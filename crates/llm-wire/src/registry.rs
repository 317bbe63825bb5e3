//! In-flight query tracking and age-based eviction.
//!
//! Every dispatched exchange gets one [`QueryEntry`] keyed by its
//! opaque [`QueryId`]. Entries exist for diagnostics (what was sent,
//! when, for which buffer) and stay around after completion until the
//! age sweep reclaims them. An exchange whose stream never ends is
//! reclaimed by the same sweep; [`cleanup_old_queries`]
//! (QueryRegistry::cleanup_old_queries) returns the evicted ids so the
//! dispatcher can release whatever per-exchange resources it still
//! holds for them.
//!
//! # Thread safety
//!
//! The registry is shared across exchanges and uses interior mutability
//! via `RwLock`.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::provider::ProviderKind;

/// Opaque identifier for one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryId(String);

impl QueryId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for QueryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What the registry remembers about one exchange.
#[derive(Debug, Clone)]
pub struct QueryEntry {
    /// When the exchange was dispatched.
    pub created: Instant,
    /// Which family served it.
    pub provider: ProviderKind,
    /// The model identifier placed in the payload.
    pub model: String,
    /// Opaque context of the host buffer the exchange belongs to.
    pub buffer: Option<String>,
    /// The outbound request body, for diagnostics.
    pub payload: Value,
}

impl QueryEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(provider: ProviderKind, model: impl Into<String>, payload: Value) -> Self {
        Self {
            created: Instant::now(),
            provider,
            model: model.into(),
            buffer: None,
            payload,
        }
    }

    /// Attaches the host buffer context.
    #[must_use]
    pub fn with_buffer(mut self, buffer: impl Into<String>) -> Self {
        self.buffer = Some(buffer.into());
        self
    }
}

/// Tracks one entry per in-flight or recently-completed exchange.
#[derive(Default)]
pub struct QueryRegistry {
    entries: RwLock<HashMap<QueryId, QueryEntry>>,
}

impl fmt::Debug for QueryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read().expect("query registry lock poisoned");
        let ids: Vec<_> = entries.keys().map(QueryId::as_str).collect();
        f.debug_struct("QueryRegistry").field("queries", &ids).finish()
    }
}

impl QueryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entry, overwriting any prior entry for the same id.
    pub fn set_query(&self, id: QueryId, entry: QueryEntry) {
        let mut entries = self.entries.write().expect("query registry lock poisoned");
        entries.insert(id, entry);
    }

    /// Looks up an entry by id.
    pub fn get_query(&self, id: &QueryId) -> Option<QueryEntry> {
        let entries = self.entries.read().expect("query registry lock poisoned");
        entries.get(id).cloned()
    }

    /// Number of tracked entries.
    pub fn len(&self) -> usize {
        self.entries.read().expect("query registry lock poisoned").len()
    }

    /// Returns `true` when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evicts stale entries.
    ///
    /// No-op while the entry count stays at or below `max_count`
    /// (passing zero forces the age check to run unconditionally).
    /// Otherwise every entry older than `max_age` is removed. Returns
    /// the evicted ids so per-exchange resources can be released in the
    /// same sweep.
    pub fn cleanup_old_queries(&self, max_count: usize, max_age: Duration) -> Vec<QueryId> {
        self.cleanup_at(Instant::now(), max_count, max_age)
    }

    fn cleanup_at(&self, now: Instant, max_count: usize, max_age: Duration) -> Vec<QueryId> {
        let mut entries = self.entries.write().expect("query registry lock poisoned");
        if entries.len() <= max_count {
            return Vec::new();
        }
        let evicted: Vec<QueryId> = entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.created) > max_age)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &evicted {
            entries.remove(id);
        }
        evicted
    }
}
