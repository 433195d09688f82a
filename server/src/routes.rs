//! Router and request handlers.

use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use plinth_retrieval::{IngestRequest, RankedHit, RetrievalError};

use crate::state::AppState;

/// Hits folded into a `/chat` reply.
const CHAT_TOP_K: usize = 5;

/// Hits folded into a `/rag-chat` reply.
const RAG_CHAT_TOP_K: usize = 3;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/rag/ingest", post(ingest))
        .route("/rag/refresh", post(refresh))
        .route("/chat", post(chat))
        .route("/rag-chat", post(rag_chat))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Status banner, doubling as the liveness probe.
async fn root(State(state): State<AppState>) -> String {
    state.config.status_banner()
}

/// Health check reflecting generation-client init state.
async fn healthz(State(state): State<AppState>) -> Response {
    match &state.init_error {
        Some(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error": err.as_ref()})),
        )
            .into_response(),
        None => Json(json!({"ok": true})).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct IngestBody {
    title: Option<String>,
    url: Option<String>,
    text: Option<String>,
}

/// Chunk, embed, and persist one document.
async fn ingest(
    State(state): State<AppState>,
    Json(body): Json<IngestBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let text = body
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("text is required"))?;

    let chunks = state
        .engine
        .ingest(IngestRequest {
            title: body.title,
            url: body.url,
            text,
        })
        .await?;

    Ok(Json(json!({"ok": true, "chunks": chunks})))
}

#[derive(Debug, Deserialize)]
struct RefreshBody {
    id: Option<String>,
}

/// Re-embed one stored record.
async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = body
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("id is required"))?;

    let dimension = state.engine.refresh_embedding(&id).await?;
    Ok(Json(json!({"ok": true, "dimension": dimension})))
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    prompt: Option<String>,
}

/// One entry of the `ragSources` array in a `/chat` reply.
#[derive(Debug, Serialize)]
struct SourceRef {
    id: String,
    title: String,
    url: String,
    score: f32,
    index: usize,
}

/// Retrieval-augmented chat. Retrieval failures degrade to a plain prompt;
/// generation failures fail the request.
async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let prompt = require_prompt(body.prompt)?;
    info!("Incoming prompt ({} chars)", prompt.len());

    let hits = retrieve_or_fall_back(&state, &prompt, CHAT_TOP_K, None).await;
    let rag_used = !hits.is_empty();

    let sources: Vec<SourceRef> = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| SourceRef {
            id: hit.id.clone(),
            title: hit.title.clone(),
            url: hit.url.clone(),
            score: hit.score,
            index: i + 1,
        })
        .collect();

    let reply = generate(&state, &prompt, &hits).await?;

    Ok(Json(json!({
        "reply": reply,
        "ragUsed": rag_used,
        "ragHits": hits.len(),
        "ragSources": sources,
    })))
}

/// Chat variant: smaller top-k, pinned-document policy, hit texts echoed
/// back as `references`.
async fn rag_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let prompt = require_prompt(body.prompt)?;
    info!("Incoming prompt ({} chars)", prompt.len());

    let pinned = state.config.pinned_doc_id.as_deref();
    let hits = retrieve_or_fall_back(&state, &prompt, RAG_CHAT_TOP_K, pinned).await;

    let reply = generate(&state, &prompt, &hits).await?;

    Ok(Json(json!({"reply": reply, "references": hits})))
}

fn require_prompt(prompt: Option<String>) -> Result<String, AppError> {
    prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("prompt is required"))
}

/// Run retrieval, degrading to an empty hit set on failure so the chat
/// request can still answer from the plain prompt.
async fn retrieve_or_fall_back(
    state: &AppState,
    prompt: &str,
    top_k: usize,
    pinned: Option<&str>,
) -> Vec<RankedHit> {
    match state.engine.retrieve(prompt, top_k, pinned).await {
        Ok(hits) => hits,
        Err(err) => {
            warn!("Retrieval failed, falling back to plain prompt: {err}");
            Vec::new()
        }
    }
}

/// Call the generation model with the grounded prompt (or the plain prompt
/// when there are no hits), under the retry policy.
async fn generate(state: &AppState, prompt: &str, hits: &[RankedHit]) -> Result<String, AppError> {
    if let Some(err) = &state.init_error {
        return Err(AppError::internal(format!(
            "generation client not initialized: {err}"
        )));
    }

    let final_prompt = if hits.is_empty() {
        prompt.to_string()
    } else {
        grounded_prompt(prompt, hits)
    };

    state
        .retry
        .run(|| state.generator.generate(&final_prompt))
        .await
        .map_err(|err| AppError::internal(format!("generation failed: {err}")))
}

/// Fold the retrieved hits into an instruction-wrapped prompt.
fn grounded_prompt(prompt: &str, hits: &[RankedHit]) -> String {
    let context = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| format!("[{}] {}\n{}", i + 1, hit.title, hit.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an assistant for this service. The context below was \
         retrieved from its document collection; treat it as the primary \
         source and answer the question without overstating beyond it.\n\n\
         [context start]\n{context}\n[context end]\n\n\
         User question:\n{prompt}"
    )
}

/// Error envelope returned by every handler: `{"error": message}` with the
/// mapped status code.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<RetrievalError> for AppError {
    fn from(err: RetrievalError) -> Self {
        if err.is_not_found() {
            return Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            };
        }
        match err {
            RetrievalError::EmptyDocument => Self::bad_request(err.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {}", self.message);
        }
        (self.status, Json(json!({"error": self.message}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hit(id: &str, title: &str, text: &str) -> RankedHit {
        RankedHit {
            id: id.to_string(),
            title: title.to_string(),
            url: String::new(),
            text: text.to_string(),
            score: 0.9,
        }
    }

    #[test]
    fn grounded_prompt_numbers_the_context_blocks() {
        let hits = vec![hit("a", "First", "alpha"), hit("b", "Second", "beta")];
        let prompt = grounded_prompt("what is alpha?", &hits);

        assert!(prompt.contains("[1] First\nalpha"));
        assert!(prompt.contains("[2] Second\nbeta"));
        assert!(prompt.contains("User question:\nwhat is alpha?"));
    }

    #[test]
    fn empty_document_maps_to_bad_request() {
        let err = AppError::from(RetrievalError::EmptyDocument);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
