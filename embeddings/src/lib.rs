//! # Embeddings
//!
//! The embedding side of the plinth retrieval core:
//!
//! - **Gateway**: one round trip per text to the hosted embedding model,
//!   tagged with the retrieval task type (document vs. query)
//! - **Similarity**: cosine scoring with a safe-degrade contract
//!
//! Two vectors are only comparable when produced by the same model; that is
//! an invariant of the caller, not enforced here.

pub mod error;
pub mod provider;
pub mod similarity;

pub use error::{EmbeddingError, Result};
pub use provider::{EmbeddingProvider, TaskType, VertexProvider};
pub use similarity::{cosine_similarity, is_valid_vector};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
