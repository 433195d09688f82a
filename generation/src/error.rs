//! Error types for the generation gateway.

use thiserror::Error;

use plinth_utils_backoff::Transient;

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors that can occur while talking to the generative model.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// No bearer token configured for the generator.
    #[error("generation client not configured: missing bearer token")]
    NotConfigured,

    /// The service answered with a non-2xx status.
    #[error("generation request failed with status {status}: {body}")]
    Transport { status: u16, body: String },

    /// The response carried no candidates.
    #[error("no candidates in generation response")]
    EmptyCandidates,

    /// The response was missing the expected nested fields.
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),

    /// Network-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Transient for GenerationError {
    fn is_transient(&self) -> bool {
        match self {
            GenerationError::Http(_) => true,
            GenerationError::Transport { status, .. } => *status == 429 || *status >= 500,
            GenerationError::NotConfigured
            | GenerationError::EmptyCandidates
            | GenerationError::MalformedResponse(_) => false,
        }
    }
}
