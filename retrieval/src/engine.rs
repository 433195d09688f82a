//! RAG engine implementation.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use plinth_corpus::{Chunker, DocumentStore, NewDocument};
use plinth_embeddings::{EmbeddingProvider, TaskType};
use plinth_utils_backoff::RetryPolicy;

use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};
use crate::ranker::{self, RankedHit};

/// A document handed to ingestion.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Title of the source document.
    pub title: Option<String>,

    /// Source URL.
    pub url: Option<String>,

    /// Full document text; will be chunked.
    pub text: String,
}

/// The RAG engine: chunking, embedding, persistence, and ranking behind one
/// type.
///
/// Collaborators are injected at construction so tests can substitute fakes;
/// there is no other shared state, so one engine serves any number of
/// concurrent requests.
pub struct RagEngine {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: Chunker,
    ingest_concurrency: usize,
    retry: RetryPolicy,
}

impl RagEngine {
    /// Create an engine builder.
    pub fn builder() -> RagEngineBuilder {
        RagEngineBuilder::new()
    }

    /// Chunk, embed, and persist one document.
    ///
    /// Chunks are embedded through a bounded concurrent pipeline and written
    /// as a single atomic batch: a failure anywhere leaves the store without
    /// any of this document's chunks. Returns the number of chunks persisted.
    pub async fn ingest(&self, request: IngestRequest) -> Result<usize> {
        if request.text.trim().is_empty() {
            return Err(RetrievalError::EmptyDocument);
        }

        let title = request.title.unwrap_or_else(|| "untitled".to_string());
        let url = request.url.unwrap_or_default();

        let chunks: Vec<String> = self
            .chunker
            .split(&request.text)
            .map(|c| c.text.to_string())
            .collect();
        info!("Ingesting \"{title}\" as {} chunks", chunks.len());

        let docs: Vec<NewDocument> = stream::iter(chunks)
            .map(|text| {
                let title = title.clone();
                let url = url.clone();
                async move {
                    let embedding = self
                        .retry
                        .run(|| self.embedder.embed(&text, TaskType::Document))
                        .await?;
                    Ok::<NewDocument, RetrievalError>(NewDocument {
                        title,
                        url,
                        text,
                        embedding,
                    })
                }
            })
            .buffered(self.ingest_concurrency)
            .try_collect()
            .await?;

        let count = docs.len();
        self.retry.run(|| self.store.put_batch(docs.clone())).await?;

        info!("Ingested \"{title}\": {count} chunks persisted");
        Ok(count)
    }

    /// Embed the prompt, scan the store, and return the best `top_k` hits.
    ///
    /// When `pinned` names an existing record it is forced into the result
    /// set with the maximum score.
    pub async fn retrieve(
        &self,
        prompt: &str,
        top_k: usize,
        pinned: Option<&str>,
    ) -> Result<Vec<RankedHit>> {
        let query = self
            .retry
            .run(|| self.embedder.embed(prompt, TaskType::Query))
            .await?;

        let records = self.retry.run(|| self.store.scan()).await?;
        debug!("Scanned {} candidate records", records.len());

        let mut hits = ranker::rank(&query, &records, top_k);
        if let Some(id) = pinned {
            hits = ranker::pin(hits, &records, id, top_k);
        }

        debug!("Query produced {} hits", hits.len());
        Ok(hits)
    }

    /// Re-embed a stored record's text and overwrite its vector.
    ///
    /// Returns the dimension of the new embedding.
    pub async fn refresh_embedding(&self, id: &str) -> Result<usize> {
        let record = self.store.get(id).await?;

        let embedding = self
            .retry
            .run(|| self.embedder.embed(&record.text, TaskType::Document))
            .await?;
        let dimension = embedding.len();

        self.retry
            .run(|| self.store.update_embedding(id, embedding.clone()))
            .await?;

        info!("Refreshed embedding for {id} ({dimension} dimensions)");
        Ok(dimension)
    }
}

/// Builder for the RAG engine.
pub struct RagEngineBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    config: RetrievalConfig,
    retry: RetryPolicy,
}

impl Default for RagEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RagEngineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            store: None,
            embedder: None,
            config: RetrievalConfig::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Set the document store.
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the embedding provider.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the retrieval configuration.
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the retry policy for external calls.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build the engine, validating the chunking configuration.
    pub fn build(self) -> Result<RagEngine> {
        let store = self
            .store
            .ok_or_else(|| RetrievalError::Config("no document store supplied".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RetrievalError::Config("no embedding provider supplied".to_string()))?;

        let chunker = Chunker::new(self.config.max_chunk_len, self.config.overlap)?;

        Ok(RagEngine {
            store,
            embedder,
            chunker,
            ingest_concurrency: self.config.ingest_concurrency.max(1),
            retry: self.retry,
        })
    }
}
