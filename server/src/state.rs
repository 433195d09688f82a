//! Shared request state.

use std::sync::Arc;

use plinth_generation::TextGenerator;
use plinth_retrieval::RagEngine;
use plinth_utils_backoff::RetryPolicy;

use crate::config::ServerConfig;

/// State shared by every request handler.
///
/// Everything here is read-only after startup: configuration, the engine,
/// and long-lived client handles. No locking discipline is required.
#[derive(Clone)]
pub struct AppState {
    /// Active configuration.
    pub config: Arc<ServerConfig>,

    /// The RAG engine.
    pub engine: Arc<RagEngine>,

    /// Generation client.
    pub generator: Arc<dyn TextGenerator>,

    /// Retry policy for generation calls (the engine carries its own).
    pub retry: RetryPolicy,

    /// Why the generation client could not be fully initialized, if so.
    /// Surfaced by `/healthz` and fatal to the chat paths.
    pub init_error: Option<Arc<str>>,
}
