//! Chat-completions wire support for llm-wire.
//!
//! Builds request bodies in the flat chat-completions shape (resolved
//! parameters merged at the top level next to a `messages` array) and
//! extracts content deltas and usage figures from the `data: `-prefixed
//! stream syntax. Reasoning models get special handling: the API
//! rejects system messages and sampling controls for them, so both are
//! stripped before anything reaches the wire.

#![warn(missing_docs)]

pub mod convert;
pub mod provider;
pub mod stream;
pub mod types;

pub use convert::{build_request, is_reasoning_model};
pub use provider::{DEFAULT_BASE_URL, endpoint_url, request_headers};
pub use stream::extract_line;
