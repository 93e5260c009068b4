//! Embedding capability: `text -> fixed-length vector`.
//!
//! - [`StubEmbedder`] hashes word features into a deterministic vector (offline runs, tests).
//! - [`HttpEmbedder`] calls an OpenAI-compatible `/embeddings` endpoint.

pub mod config;
mod error;
pub mod http;
pub mod stub;

use async_trait::async_trait;

pub use config::HttpEmbedderConfig;
pub use error::EmbeddingError;
pub use http::HttpEmbedder;
pub use stub::StubEmbedder;

#[async_trait]
/// Turns normalized query text into an embedding vector.
pub trait Embedder: Send + Sync {
    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Output dimension of [`Embedder::embed`].
    fn dimension(&self) -> usize;
}
