//! Environment-driven server configuration.

use std::path::PathBuf;

use tracing::warn;

/// Server configuration, read from the environment with fixed fallbacks.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,

    /// Cloud project both models are served under.
    pub project: String,

    /// Region of the chat model.
    pub chat_location: String,

    /// Chat model identifier.
    pub chat_model: String,

    /// Region of the embedding model.
    pub emb_location: String,

    /// Embedding model identifier.
    pub emb_model: String,

    /// Collection name documents are stored under.
    pub collection: String,

    /// Directory holding the collection file.
    pub data_dir: PathBuf,

    /// Record id forced into every `/rag-chat` result set, when present.
    pub pinned_doc_id: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl ServerConfig {
    /// Read the configuration from the environment.
    pub fn from_env() -> Self {
        let port = match env_or("PORT", "8080").parse() {
            Ok(port) => port,
            Err(_) => {
                warn!("PORT is not a valid port number, falling back to 8080");
                8080
            }
        };

        Self {
            port,
            project: env_or("GOOGLE_CLOUD_PROJECT", "local-dev"),
            chat_location: env_or("VERTEX_LOCATION", "asia-northeast1"),
            chat_model: env_or("CHAT_MODEL", "gemini-2.5-flash"),
            emb_location: env_or("EMB_LOCATION", "us-central1"),
            emb_model: env_or("EMB_MODEL", "text-embedding-004"),
            collection: env_or("RAG_COLLECTION", "rag_documents"),
            data_dir: PathBuf::from(env_or("RAG_DATA_DIR", "data")),
            pinned_doc_id: std::env::var("PINNED_DOC_ID").ok().filter(|v| !v.is_empty()),
        }
    }

    /// The plain-text status banner served at `/`.
    pub fn status_banner(&self) -> String {
        format!(
            "plinth backend is running\n\
             project={}\n\
             chat_location={}\n\
             chat_model={}\n\
             emb_location={}\n\
             emb_model={}\n\
             rag_collection={}",
            self.project,
            self.chat_location,
            self.chat_model,
            self.emb_location,
            self.emb_model,
            self.collection
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_lists_the_active_configuration() {
        let config = ServerConfig {
            port: 8080,
            project: "proj".to_string(),
            chat_location: "asia-northeast1".to_string(),
            chat_model: "gemini-2.5-flash".to_string(),
            emb_location: "us-central1".to_string(),
            emb_model: "text-embedding-004".to_string(),
            collection: "rag_documents".to_string(),
            data_dir: PathBuf::from("data"),
            pinned_doc_id: None,
        };

        let banner = config.status_banner();
        assert!(banner.contains("project=proj"));
        assert!(banner.contains("chat_model=gemini-2.5-flash"));
        assert!(banner.contains("rag_collection=rag_documents"));
    }
}
