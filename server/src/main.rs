use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use plinth_corpus::FileStore;
use plinth_embeddings::VertexProvider;
use plinth_generation::VertexGenerator;
use plinth_retrieval::RagEngine;
use plinth_server::{AppState, ServerConfig, router};
use plinth_utils_backoff::RetryPolicy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    info!(
        "Starting plinth backend: project={}, chat={}@{}, emb={}@{}, collection={}",
        config.project,
        config.chat_model,
        config.chat_location,
        config.emb_model,
        config.emb_location,
        config.collection
    );

    let store = FileStore::open(&config.data_dir, &config.collection).await?;
    let embedder = VertexProvider::new(&config.project, &config.emb_location, &config.emb_model);

    let engine = RagEngine::builder()
        .with_store(Arc::new(store))
        .with_embedder(Arc::new(embedder))
        .build()?;

    let generator =
        VertexGenerator::new(&config.project, &config.chat_location, &config.chat_model);

    // The models share one bearer token; without it every upstream call is
    // doomed, which /healthz should say up front.
    let init_error: Option<Arc<str>> = std::env::var(plinth_generation::client::TOKEN_ENV)
        .is_err()
        .then(|| {
            Arc::from(format!(
                "no bearer token in {}",
                plinth_generation::client::TOKEN_ENV
            ))
        });
    match &init_error {
        Some(err) => error!("Generation client init: {err}"),
        None => info!("Generation client initialized: model={}", config.chat_model),
    }

    let port = config.port;
    let state = AppState {
        config: Arc::new(config),
        engine: Arc::new(engine),
        generator: Arc::new(generator),
        retry: RetryPolicy::default(),
        init_error,
    };

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
