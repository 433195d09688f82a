//! Embedding gateway.
//!
//! Wraps the hosted text-embedding endpoint behind [`EmbeddingProvider`].
//! One request per text; no caching and no batching. Retry is layered above
//! the gateway by the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Environment variable holding the bearer token for the embedding endpoint.
pub const TOKEN_ENV: &str = "VERTEX_ACCESS_TOKEN";

/// Tag distinguishing what an embedding request represents.
///
/// Documents being stored and queries being matched are embedded differently
/// by the model; mixing the two degrades retrieval quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// A document chunk to be stored.
    Document,
    /// A query to be matched against stored chunks.
    Query,
}

impl TaskType {
    /// Wire form expected by the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Document => "RETRIEVAL_DOCUMENT",
            TaskType::Query => "RETRIEVAL_QUERY",
        }
    }
}

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier behind this provider.
    fn model(&self) -> &str;

    /// Generate an embedding for the given text and task type.
    ///
    /// Suspends the caller for one network round trip. A single failure
    /// propagates immediately; the provider never retries on its own.
    async fn embed(&self, text: &str, task: TaskType) -> Result<Embedding>;
}

/// Gateway to a Vertex-style text-embedding `:predict` endpoint.
pub struct VertexProvider {
    /// Scheme + host, e.g. `https://us-central1-aiplatform.googleapis.com`.
    base_url: String,

    /// Cloud project the model is served under.
    project: String,

    /// Region the model is served in.
    location: String,

    /// Embedding model identifier.
    model: String,

    /// Bearer token for the endpoint.
    bearer_token: Option<String>,

    /// HTTP client.
    client: reqwest::Client,
}

impl VertexProvider {
    /// Create a provider for the given project, location, and model.
    ///
    /// The bearer token is read from `VERTEX_ACCESS_TOKEN` if set; override
    /// it with [`VertexProvider::with_bearer_token`].
    pub fn new(
        project: impl Into<String>,
        location: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let location = location.into();
        Self {
            base_url: format!("https://{location}-aiplatform.googleapis.com"),
            project: project.into(),
            location,
            model: model.into(),
            bearer_token: std::env::var(TOKEN_ENV).ok(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the endpoint base URL (used by tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Drop any configured bearer token (used by tests).
    pub fn without_bearer_token(mut self) -> Self {
        self.bearer_token = None;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:predict",
            self.base_url, self.project, self.location, self.model
        )
    }
}

#[async_trait]
impl EmbeddingProvider for VertexProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str, task: TaskType) -> Result<Embedding> {
        let token = self
            .bearer_token
            .as_ref()
            .ok_or(EmbeddingError::NotConfigured)?;

        debug!("Embedding {} chars as {}", text.len(), task.as_str());

        let body = PredictRequest {
            instances: vec![Instance {
                content: text,
                task_type: task.as_str(),
            }],
            parameters: serde_json::json!({}),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {token}"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await?;
        let parsed: PredictResponse = serde_json::from_str(&raw)
            .map_err(|e| EmbeddingError::MalformedResponse(e.to_string()))?;

        let prediction = parsed
            .predictions
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyPrediction)?;

        let values = prediction
            .embeddings
            .and_then(|e| e.values)
            .ok_or_else(|| {
                EmbeddingError::MalformedResponse(
                    "missing predictions[0].embeddings.values".to_string(),
                )
            })?;

        debug!("Received embedding with {} dimensions", values.len());
        Ok(values)
    }
}

/// Request shape for the `:predict` endpoint.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    content: &'a str,
    task_type: &'a str,
}

/// Response shape for the `:predict` endpoint. Everything below the
/// predictions array is optional so that a missing field maps to
/// `MalformedResponse` rather than a decode failure.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    embeddings: Option<EmbeddingsField>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsField {
    values: Option<Vec<f32>>,
}
