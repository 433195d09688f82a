//! Error types for the RAG engine.

use thiserror::Error;

use plinth_corpus::{CorpusError, StoreError};
use plinth_embeddings::EmbeddingError;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the RAG engine.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Chunking or storage error.
    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),

    /// Embedding gateway error.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Engine was assembled without a required collaborator.
    #[error("configuration error: {0}")]
    Config(String),

    /// Ingestion was asked to store a document with no text.
    #[error("document has no text to ingest")]
    EmptyDocument,
}

impl RetrievalError {
    /// Whether this error means a requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RetrievalError::Corpus(CorpusError::Store(StoreError::NotFound(_)))
        )
    }
}
