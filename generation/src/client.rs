//! Generation gateway.
//!
//! Same REST-client shape as the embedding gateway, pointed at the
//! `:generateContent` endpoint. Generation failures are always fatal to the
//! request that triggered them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GenerationError, Result};

/// Environment variable holding the bearer token for the generation endpoint.
pub const TOKEN_ENV: &str = "VERTEX_ACCESS_TOKEN";

/// Trait for text generators.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier behind this generator.
    fn model(&self) -> &str;

    /// Generate a reply for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Gateway to a Vertex-style `:generateContent` endpoint.
pub struct VertexGenerator {
    base_url: String,
    project: String,
    location: String,
    model: String,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl VertexGenerator {
    /// Create a generator for the given project, location, and model.
    ///
    /// The bearer token is read from `VERTEX_ACCESS_TOKEN` if set; override
    /// it with [`VertexGenerator::with_bearer_token`].
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

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.base_url, self.project, self.location, self.model
        )
    }
}

#[async_trait]
impl TextGenerator for VertexGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let token = self
            .bearer_token
            .as_ref()
            .ok_or(GenerationError::NotConfigured)?;

        debug!("Generating reply for a {}-char prompt", prompt.len());

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
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
            return Err(GenerationError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&raw)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or(GenerationError::EmptyCandidates)?;

        let text = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                GenerationError::MalformedResponse(
                    "missing candidates[0].content.parts[0].text".to_string(),
                )
            })?;

        debug!("Received a {}-char reply", text.len());
        Ok(text)
    }
}

/// Request shape for the `:generateContent` endpoint.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response shape for the `:generateContent` endpoint; every nested level is
/// optional so a missing field maps to `MalformedResponse`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
