//! The dispatch orchestrator.
//!
//! [`QueryClient::query`] is the single entry point for starting an
//! exchange. It resolves the credential through the store seam, builds
//! the provider-shaped payload, registers the query, starts the
//! transport, and drives the decoder, surfacing deltas to the caller's
//! handlers as they arrive. The call itself returns immediately; the
//! exchange runs on a spawned task.
//!
//! Per exchange, callback ordering is strict: deltas arrive in the
//! order their terminating newlines arrived, and `on_exit` then
//! `on_complete` fire exactly once each, after the final flush. Across
//! exchanges, no ordering is promised. A transport that fails before
//! any body arrives reports through `on_exit` alone; there is nothing
//! to complete.
//!
//! Exchanges whose streams never end are reclaimed by the same
//! age-based sweep that trims the query registry: eviction aborts the
//! driver task, dropping its decoder and handlers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use llm_wire::chat::Message;
use llm_wire::decode::StreamDecoder;
use llm_wire::metrics::{Usage, UsageSlot};
use llm_wire::params::{ModelSpec, resolve_params};
use llm_wire::provider::{ProviderKind, pinned_model};
use llm_wire::registry::{QueryEntry, QueryId, QueryRegistry};
use llm_wire::session::SessionFlags;
use serde_json::Value;
use tokio::task::AbortHandle;
use tracing::{debug, error, instrument, warn};

use crate::credentials::CredentialStore;
use crate::dispatch;
use crate::transport::{Transport, TransportRequest};

/// Tunables for a [`QueryClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the chat-completions family.
    pub openai_base_url: String,
    /// Base URL for the Messages-API family.
    pub anthropic_base_url: String,
    /// Base URL for the GenerateContent family.
    pub gemini_base_url: String,
    /// Registry size above which the age sweep runs.
    pub max_tracked_queries: usize,
    /// Age beyond which a swept query is evicted.
    pub max_query_age: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            openai_base_url: llm_wire_openai::DEFAULT_BASE_URL.into(),
            anthropic_base_url: llm_wire_anthropic::DEFAULT_BASE_URL.into(),
            gemini_base_url: llm_wire_gemini::DEFAULT_BASE_URL.into(),
            max_tracked_queries: 32,
            max_query_age: Duration::from_secs(900),
        }
    }
}

/// One exchange request: the conversation plus the model reference.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The normalized conversation, oldest turn first.
    pub messages: Vec<Message>,
    /// The model reference, bare or configured.
    pub model: ModelSpec,
    /// Pass stream lines through verbatim instead of extracting
    /// content, fenced as a raw JSON block.
    pub raw_output: bool,
}

impl ChatRequest {
    /// Creates a request with extraction enabled.
    pub fn new(messages: Vec<Message>, model: ModelSpec) -> Self {
        Self {
            messages,
            model,
            raw_output: false,
        }
    }

    /// Switches raw passthrough on or off.
    #[must_use]
    pub fn raw_output(mut self, raw: bool) -> Self {
        self.raw_output = raw;
        self
    }
}

/// The caller's per-exchange callbacks.
///
/// `on_delta` fires once per surfaced delta, in order. `on_exit` and
/// `on_complete` each fire at most once, after the final flush; either
/// may be absent without error.
pub struct QueryHandlers {
    /// Receives each content delta with the exchange id.
    pub on_delta: Box<dyn FnMut(&QueryId, &str) + Send>,
    /// Runs once when the exchange ends, however it ends.
    pub on_exit: Option<Box<dyn FnOnce(&QueryId) + Send>>,
    /// Runs once with the full accumulated response after a stream
    /// reached its end.
    pub on_complete: Option<Box<dyn FnOnce(String) + Send>>,
}

impl QueryHandlers {
    /// Creates handlers with only a delta callback.
    pub fn new(on_delta: impl FnMut(&QueryId, &str) + Send + 'static) -> Self {
        Self {
            on_delta: Box::new(on_delta),
            on_exit: None,
            on_complete: None,
        }
    }

    /// Sets the exit callback.
    #[must_use]
    pub fn on_exit(mut self, f: impl FnOnce(&QueryId) + Send + 'static) -> Self {
        self.on_exit = Some(Box::new(f));
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnOnce(String) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}

/// Starts exchanges and tracks them while they run.
pub struct QueryClient {
    config: ClientConfig,
    credentials: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    flags: Arc<SessionFlags>,
    registry: Arc<QueryRegistry>,
    usage: UsageSlot,
    drivers: Arc<Mutex<HashMap<QueryId, AbortHandle>>>,
}

impl QueryClient {
    /// Creates a client with default configuration.
    pub fn new(credentials: Arc<dyn CredentialStore>, transport: Arc<dyn Transport>) -> Self {
        Self::with_config(ClientConfig::default(), credentials, transport)
    }

    /// Creates a client with explicit configuration.
    pub fn with_config(
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            credentials,
            transport,
            flags: Arc::new(SessionFlags::new()),
            registry: Arc::new(QueryRegistry::new()),
            usage: UsageSlot::new(),
            drivers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The session feature flags payload builders read.
    pub fn session_flags(&self) -> Arc<SessionFlags> {
        self.flags.clone()
    }

    /// A defensive copy of the current usage figures.
    pub fn usage_snapshot(&self) -> Usage {
        self.usage.snapshot()
    }

    /// Looks up a tracked query by id.
    pub fn get_query(&self, id: &QueryId) -> Option<QueryEntry> {
        self.registry.get_query(id)
    }

    /// How many queries the registry currently tracks.
    pub fn tracked_queries(&self) -> usize {
        self.registry.len()
    }

    /// Starts one exchange and returns its id immediately.
    ///
    /// Must be called within a tokio runtime; the exchange itself runs
    /// on a spawned task. `buffer` is the host application's opaque
    /// context for the conversation the exchange belongs to.
    #[instrument(skip_all, fields(provider = %provider, model = request.model.name()))]
    pub fn query(
        &self,
        buffer: Option<String>,
        provider: ProviderKind,
        request: ChatRequest,
        handlers: QueryHandlers,
    ) -> QueryId {
        let id = QueryId::new();
        let model = pinned_model(request.model.name()).to_string();
        let resolved = resolve_params(provider, &request.model);
        let body =
            dispatch::build_payload(provider, &model, &request.messages, &resolved, &self.flags);
        let url = dispatch::endpoint_url(provider, &self.config, &model);

        let mut entry = QueryEntry::new(provider, model, body.clone());
        if let Some(buffer) = buffer {
            entry = entry.with_buffer(buffer);
        }
        self.registry.set_query(id.clone(), entry);
        self.sweep();

        debug!(id = %id, "dispatching exchange");
        let exchange = Exchange {
            id: id.clone(),
            provider,
            url,
            body,
            raw_output: request.raw_output,
            credentials: self.credentials.clone(),
            transport: self.transport.clone(),
            usage: self.usage.clone(),
            drivers: self.drivers.clone(),
        };
        let handle = tokio::spawn(exchange.run(handlers));
        self.drivers
            .lock()
            .expect("driver map lock poisoned")
            .insert(id.clone(), handle.abort_handle());
        id
    }

    /// Trims the registry and aborts the drivers of evicted exchanges,
    /// so a stream that never ended cannot hold its buffers forever.
    fn sweep(&self) {
        let evicted = self
            .registry
            .cleanup_old_queries(self.config.max_tracked_queries, self.config.max_query_age);
        if evicted.is_empty() {
            return;
        }
        debug!(count = evicted.len(), "evicting stale queries");
        let mut drivers = self.drivers.lock().expect("driver map lock poisoned");
        for id in evicted {
            if let Some(handle) = drivers.remove(&id) {
                handle.abort();
            }
        }
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("config", &self.config)
            .field("tracked_queries", &self.registry.len())
            .finish()
    }
}

/// Everything one spawned driver task needs.
struct Exchange {
    id: QueryId,
    provider: ProviderKind,
    url: String,
    body: Value,
    raw_output: bool,
    credentials: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    usage: UsageSlot,
    drivers: Arc<Mutex<HashMap<QueryId, AbortHandle>>>,
}

impl Exchange {
    async fn run(self, mut handlers: QueryHandlers) {
        let Some(secret) = self.credentials.secret(self.provider).await else {
            error!(provider = %self.provider, "no credential available; dropping exchange");
            self.fail(&mut handlers);
            return;
        };

        let headers = match dispatch::request_headers(self.provider, &secret) {
            Ok(headers) => headers,
            Err(err) => {
                error!(%err, "could not build request headers");
                self.fail(&mut handlers);
                return;
            }
        };

        let request = TransportRequest {
            url: self.url.clone(),
            headers,
            body: self.body.clone(),
        };
        let mut stream = match self.transport.dispatch(request).await {
            Ok(stream) => stream,
            Err(err) => {
                error!(%err, "transport dispatch failed");
                self.fail(&mut handlers);
                return;
            }
        };

        let mut decoder = StreamDecoder::new(self.raw_output);
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    for delta in self.feed(&mut decoder, Some(bytes.as_ref())) {
                        (handlers.on_delta)(&self.id, &delta);
                    }
                }
                Err(err) => {
                    // The stream is over; whatever decoded so far is
                    // still flushed and surfaced below.
                    warn!(%err, "stream read error");
                    break;
                }
            }
        }

        for delta in self.feed(&mut decoder, None) {
            (handlers.on_delta)(&self.id, &delta);
        }

        debug!(id = %self.id, chars = decoder.response().len(), "exchange complete");
        if let Some(on_exit) = handlers.on_exit.take() {
            on_exit(&self.id);
        }
        if let Some(on_complete) = handlers.on_complete.take() {
            on_complete(decoder.into_response());
        }
        self.release();
    }

    /// Runs one decoder step with the per-line extractor writing
    /// through to the shared usage slot.
    fn feed(&self, decoder: &mut StreamDecoder, chunk: Option<&[u8]>) -> Vec<String> {
        let provider = self.provider;
        let usage = &self.usage;
        decoder.feed(chunk, |line| {
            usage.update(|u| dispatch::extract_line(provider, line, u))
        })
    }

    /// Ends an exchange that never produced a stream: exit fires, but
    /// there is no completion to report.
    fn fail(&self, handlers: &mut QueryHandlers) {
        if let Some(on_exit) = handlers.on_exit.take() {
            on_exit(&self.id);
        }
        self.release();
    }

    fn release(&self) {
        self.drivers
            .lock()
            .expect("driver map lock poisoned")
            .remove(&self.id);
    }
}
