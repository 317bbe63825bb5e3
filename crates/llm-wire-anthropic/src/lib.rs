//! Messages-API wire support for llm-wire.
//!
//! Builds request bodies in the separate-system-channel shape: the
//! leading run of system messages moves into a dedicated `system` array
//! (preserving cache-control annotations per entry) while the rest of
//! the conversation stays in `messages`. Extraction understands the
//! typed event stream (`content_block_start`, `content_block_delta`,
//! usage blocks on `message_start` and `message_delta`).

#![warn(missing_docs)]

pub mod convert;
pub mod provider;
pub mod stream;
pub mod types;

pub use convert::build_request;
pub use provider::{API_VERSION, DEFAULT_BASE_URL, endpoint_url, request_headers};
pub use stream::extract_line;
