//! GenerateContent wire support for llm-wire.
//!
//! Builds request bodies in the role-renamed, content-merged shape:
//! `system` and `user` turns both travel as `user`, `assistant` becomes
//! `model`, every turn's text is wrapped in a `parts` array, and runs
//! of consecutive same-role turns collapse into one entry. Tuning
//! parameters nest under `generationConfig` and a fixed safety-settings
//! block rides along on every request.

#![warn(missing_docs)]

pub mod convert;
pub mod provider;
pub mod stream;
pub mod types;

pub use convert::build_request;
pub use provider::{DEFAULT_BASE_URL, endpoint_url, request_headers};
pub use stream::extract_line;
