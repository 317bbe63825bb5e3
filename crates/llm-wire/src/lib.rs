//! # llm-wire
//!
//! Provider-agnostic core for translating a normalized conversation into
//! provider wire payloads and decoding the streamed response back into
//! content deltas and usage metrics.
//!
//! This crate contains **no I/O**. It defines the shared vocabulary
//! (messages, errors, the provider family enum), the parameter schema
//! registry and resolver, the per-exchange stream decoder state machine,
//! the process-wide usage slot, and the in-flight query registry.
//! Provider-specific payload shaping and per-line extraction live in
//! sibling crates; the dispatch orchestrator that wires everything to a
//! transport lives in `llm-wire-client`.
//!
//! # Crates
//!
//! | Crate | Purpose |
//! |-------|---------|
//! | `llm-wire` | Core types, schema resolution, stream decoding |
//! | `llm-wire-openai` | Chat-completions payloads and stream syntax |
//! | `llm-wire-anthropic` | Messages-API payloads and stream syntax |
//! | `llm-wire-gemini` | GenerateContent payloads and stream syntax |
//! | `llm-wire-client` | Dispatch orchestrator, credential and transport seams |
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────────┐ ┌─────────────────────┐ ┌──────────────────┐
//!  │  llm-wire-openai │ │  llm-wire-anthropic │ │  llm-wire-gemini │
//!  └────────┬─────────┘ └──────────┬──────────┘ └─────────┬────────┘
//!           │                      │                      │
//!           └──────────┬───────────┴───────────┬──────────┘
//!                      │                       │
//!                      ▼                       ▼
//!           ┌─────────────────────────────────────────┐
//!           │                llm-wire                 │  ← you are here
//!           │  (Message, ProviderKind, Schema, etc.)  │
//!           └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`chat`] | Conversation messages and roles |
//! | [`decode`] | The per-exchange stream decoder state machine |
//! | [`error`] | Unified [`WireError`] across the workspace |
//! | [`metrics`] | Token usage and the shared [`UsageSlot`] |
//! | [`params`] | Parameter schemas, resolution, and agent validation |
//! | [`provider`] | The closed [`ProviderKind`] family enum |
//! | [`registry`] | In-flight query tracking and age-based eviction |
//! | [`session`] | Shared session feature flags |

#![warn(missing_docs)]

pub mod chat;
pub mod decode;
pub mod error;
pub mod metrics;
pub mod params;
pub mod provider;
pub mod registry;
pub mod session;

// ── Core re-exports ────────────────────────────────────────────────
//
// Only the types that appear in nearly every program are re-exported
// at the crate root. Everything else lives in its submodule.

pub use chat::{CacheControl, Message, Role};
pub use decode::StreamDecoder;
pub use error::WireError;
pub use metrics::{Usage, UsageSlot};
pub use params::{AgentConfig, ModelSpec, Schema, ValidationReport};
pub use provider::ProviderKind;
pub use registry::{QueryEntry, QueryId, QueryRegistry};
pub use session::SessionFlags;
