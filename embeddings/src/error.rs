//! Error types for the embedding gateway.

use thiserror::Error;

use plinth_utils_backoff::Transient;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur while talking to the embedding service.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// No bearer token configured for the provider.
    #[error("embedding provider not configured: missing bearer token")]
    NotConfigured,

    /// The service answered with a non-2xx status.
    #[error("embedding request failed with status {status}: {body}")]
    Transport { status: u16, body: String },

    /// The response carried no predictions.
    #[error("no predictions in embedding response")]
    EmptyPrediction,

    /// The response was missing the expected nested fields.
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),

    /// Network-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Transient for EmbeddingError {
    fn is_transient(&self) -> bool {
        match self {
            EmbeddingError::Http(_) => true,
            EmbeddingError::Transport { status, .. } => *status == 429 || *status >= 500,
            EmbeddingError::NotConfigured
            | EmbeddingError::EmptyPrediction
            | EmbeddingError::MalformedResponse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_side_failures_are_transient() {
        assert!(
            EmbeddingError::Transport {
                status: 503,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            EmbeddingError::Transport {
                status: 429,
                body: String::new()
            }
            .is_transient()
        );
    }

    #[test]
    fn client_side_failures_are_permanent() {
        assert!(
            !EmbeddingError::Transport {
                status: 400,
                body: String::new()
            }
            .is_transient()
        );
        assert!(!EmbeddingError::EmptyPrediction.is_transient());
        assert!(!EmbeddingError::MalformedResponse("x".to_string()).is_transient());
    }
}
