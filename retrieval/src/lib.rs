//! # Retrieval
//!
//! The RAG engine: both halves of the retrieval core behind one type.
//!
//! - **Ingestion**: chunk a document, embed every chunk, persist the batch
//!   atomically
//! - **Query**: embed the prompt, scan the store, rank by cosine similarity,
//!   optionally force a pinned record into the result set
//!
//! ```text
//! ingest:  text ── Chunker ── EmbeddingProvider ── DocumentStore
//! query:   prompt ── EmbeddingProvider ── DocumentStore ── rank ── hits
//! ```
//!
//! Collaborators are injected, never ambient; every external call runs under
//! the engine's retry policy.

pub mod config;
pub mod engine;
pub mod error;
pub mod ranker;

pub use config::RetrievalConfig;
pub use engine::{IngestRequest, RagEngine, RagEngineBuilder};
pub use error::{Result, RetrievalError};
pub use ranker::{PINNED_SCORE, RankedHit, pin, rank};

// Re-export from dependencies for convenience
pub use plinth_corpus::{DocumentRecord, DocumentStore, FileStore, MemoryStore, NewDocument};
pub use plinth_embeddings::{EmbeddingProvider, TaskType, VertexProvider};
pub use plinth_utils_backoff::RetryPolicy;
