//! # llm-wire-client
//!
//! The dispatch orchestrator of the llm-wire workspace. Composes the
//! core crate (schema resolution, stream decoding, query tracking)
//! with the provider family crates (payload shaping, line extraction)
//! behind two injectable seams:
//!
//! - [`CredentialStore`]: where API secrets come from. May resolve
//!   synchronously or asynchronously; the dispatcher awaits either.
//! - [`Transport`]: what actually moves bytes. [`HttpTransport`] is
//!   the batteries-included implementation; tests script their own.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use llm_wire::{Message, ModelSpec, ProviderKind};
//! use llm_wire_client::{
//!     ChatRequest, EnvCredentials, HttpTransport, QueryClient, QueryHandlers,
//! };
//!
//! # async fn example() {
//! let client = QueryClient::new(
//!     Arc::new(EnvCredentials),
//!     Arc::new(HttpTransport::new()),
//! );
//!
//! let request = ChatRequest::new(
//!     vec![Message::user("Explain ownership in Rust")],
//!     ModelSpec::Name("claude-sonnet-4-5".into()),
//! );
//! let handlers = QueryHandlers::new(|_id, delta| print!("{delta}"))
//!     .on_complete(|full| println!("\n[{} chars]", full.len()));
//!
//! client.query(None, ProviderKind::Anthropic, request, handlers);
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod credentials;
mod dispatch;
pub mod transport;

pub use client::{ChatRequest, ClientConfig, QueryClient, QueryHandlers};
pub use credentials::{CredentialStore, EnvCredentials};
pub use transport::{ByteStream, HttpTransport, Transport, TransportRequest};
