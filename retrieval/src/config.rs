//! Configuration for the RAG engine.

use serde::{Deserialize, Serialize};

use plinth_corpus::chunker::{DEFAULT_MAX_LEN, DEFAULT_OVERLAP};

/// Configuration for the RAG engine.
///
/// `top_k` is deliberately absent: how many hits a caller wants is a
/// per-query parameter, not engine state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunk window size in characters.
    pub max_chunk_len: usize,

    /// Overlap between consecutive chunks, in characters.
    pub overlap: usize,

    /// How many chunks may be embedded concurrently during ingestion.
    pub ingest_concurrency: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_chunk_len: DEFAULT_MAX_LEN,
            overlap: DEFAULT_OVERLAP,
            ingest_concurrency: 4,
        }
    }
}

impl RetrievalConfig {
    /// Set the chunk window size.
    pub fn with_max_chunk_len(mut self, max_chunk_len: usize) -> Self {
        self.max_chunk_len = max_chunk_len;
        self
    }

    /// Set the chunk overlap.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Set the ingestion concurrency cap.
    pub fn with_ingest_concurrency(mut self, n: usize) -> Self {
        self.ingest_concurrency = n.max(1);
        self
    }
}
