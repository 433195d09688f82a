//! # Server
//!
//! The HTTP surface of the grounded chat backend:
//!
//! | Route | Behavior |
//! |---|---|
//! | `GET /` | plain-text status banner with the active configuration |
//! | `GET /healthz` | `{ok}` reflecting generation-client init state |
//! | `POST /rag/ingest` | chunk + embed + persist a document |
//! | `POST /rag/refresh` | re-embed one stored record |
//! | `POST /chat` | retrieval-augmented reply, degrading to a plain prompt |
//! | `POST /rag-chat` | variant with smaller top-k and the pinned-document policy |

pub mod config;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::router;
pub use state::AppState;
