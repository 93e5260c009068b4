//! Candidate retrieval: query text -> embedding -> top-K reference jobs.

mod error;


use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::constants::{
    DEFAULT_COLLABORATOR_TIMEOUT_SECS, DEFAULT_TOP_K, DimValidationError, validate_embedding_dim,
};
use crate::corpus::{Candidate, CorpusIndex, RetrievalFilters};
use crate::embedding::Embedder;

pub use error::RetrievalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Bound on a single embedding call.
    pub embed_timeout: Duration,
    /// Bound on a single corpus search.
    pub search_timeout: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            embed_timeout: Duration::from_secs(DEFAULT_COLLABORATOR_TIMEOUT_SECS),
            search_timeout: Duration::from_secs(DEFAULT_COLLABORATOR_TIMEOUT_SECS),
        }
    }
}

/// Embeds queries and searches the corpus, each call under its own timeout.
pub struct CandidateRetriever<I: CorpusIndex> {
    embedder: Arc<dyn Embedder>,
    index: Arc<I>,
    config: RetrievalConfig,
}

impl<I: CorpusIndex> CandidateRetriever<I> {
    /// Fails if the embedder and index disagree on vector dimension.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<I>,
        config: RetrievalConfig,
    ) -> Result<Self, RetrievalError> {
        validate_embedding_dim(embedder.dimension(), index.dimension()).map_err(|e| match e {
            DimValidationError::DimensionMismatch { expected, actual } => {
                RetrievalError::DimensionMismatch { expected, actual }
            }
            DimValidationError::ZeroDimension => RetrievalError::DimensionMismatch {
                expected: index.dimension(),
                actual: 0,
            },
        })?;
        Ok(Self {
            embedder,
            index,
            config,
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn index(&self) -> &Arc<I> {
        &self.index
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let embedding = tokio::time::timeout(self.config.embed_timeout, self.embedder.embed(text))
            .await
            .map_err(|_| RetrievalError::Timeout {
                stage: "embedding",
                elapsed: self.config.embed_timeout,
            })??;

        if embedding.len() != self.index.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: embedding.len(),
            });
        }
        Ok(embedding)
    }

    /// Top-`top_k` candidates by descending cosine similarity.
    ///
    /// An empty list is a valid outcome (empty corpus or over-narrow filters).
    #[instrument(skip(self, embedding))]
    pub async fn retrieve(
        &self,
        embedding: &[f32],
        top_k: usize,
        filters: &RetrievalFilters,
    ) -> Result<Vec<Candidate>, RetrievalError> {
        let candidates = tokio::time::timeout(
            self.config.search_timeout,
            self.index.search(embedding, top_k, filters),
        )
        .await
        .map_err(|_| RetrievalError::Timeout {
            stage: "corpus search",
            elapsed: self.config.search_timeout,
        })??;

        debug!(
            returned = candidates.len(),
            best = candidates.first().map(|c| c.similarity),
            "Retrieved candidates"
        );
        Ok(candidates)
    }

    /// [`Self::embed_query`] followed by [`Self::retrieve`] with the configured `top_k`.
    pub async fn retrieve_text(
        &self,
        text: &str,
        filters: &RetrievalFilters,
    ) -> Result<(Vec<f32>, Vec<Candidate>), RetrievalError> {
        let embedding = self.embed_query(text).await?;
        let candidates = self
            .retrieve(&embedding, self.config.top_k, filters)
            .await?;
        Ok((embedding, candidates))
    }
}
