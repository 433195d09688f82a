//! # Corpus
//!
//! Document-side pieces of the plinth retrieval core:
//!
//! - **Chunking**: fixed-length overlapping windows over source text
//! - **Records**: the persisted chunk + embedding + metadata shape
//! - **Storage**: the document store seam, with file-backed and in-memory
//!   backends
//!
//! The store trait is the boundary to whatever actually persists records; the
//! rest of the system only ever sees [`DocumentStore`].

pub mod chunker;
pub mod document;
pub mod error;
pub mod store;

pub use chunker::{Chunk, Chunker};
pub use document::{DocumentRecord, NewDocument};
pub use error::{CorpusError, Result, StoreError};
pub use store::{DocumentStore, FileStore, MemoryStore};
