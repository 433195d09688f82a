//! # Generation
//!
//! Gateway to the hosted generative model. The chat paths hand it a fully
//! assembled prompt (grounded or plain) and get back the reply text; prompt
//! assembly and retrieval live elsewhere.

pub mod client;
pub mod error;

pub use client::{TextGenerator, VertexGenerator};
pub use error::{GenerationError, Result};
