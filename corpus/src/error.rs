//! Error types for the corpus crate.

use thiserror::Error;

use plinth_utils_backoff::Transient;

/// Result type alias for corpus operations.
pub type Result<T> = std::result::Result<T, CorpusError>;

/// Errors that can occur while chunking or storing documents.
#[derive(Error, Debug)]
pub enum CorpusError {
    /// Chunking was configured with an unusable window/overlap pair.
    #[error("invalid chunking parameters: {0}")]
    InvalidChunking(String),

    /// Storage operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create the storage directory.
    #[error("failed to create directory: {0}")]
    CreateDirectory(String),

    /// Failed to read the collection file.
    #[error("failed to read collection: {0}")]
    ReadCollection(String),

    /// Failed to commit the collection file.
    #[error("failed to write collection: {0}")]
    WriteCollection(String),

    /// No record with the requested id.
    #[error("document not found: {0}")]
    NotFound(String),
}

impl Transient for CorpusError {
    fn is_transient(&self) -> bool {
        match self {
            CorpusError::Io(_) => true,
            CorpusError::Store(err) => matches!(
                err,
                StoreError::CreateDirectory(_)
                    | StoreError::ReadCollection(_)
                    | StoreError::WriteCollection(_)
            ),
            CorpusError::InvalidChunking(_) | CorpusError::Serialization(_) => false,
        }
    }
}
