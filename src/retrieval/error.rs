use std::time::Duration;

use thiserror::Error;

use crate::corpus::CorpusError;
use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("corpus search failed: {0}")]
    Search(#[from] CorpusError),

    #[error("{stage} timed out after {elapsed:?}")]
    Timeout {
        stage: &'static str,
        elapsed: Duration,
    },

    #[error("embedder produced dimension {actual}, corpus expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}
