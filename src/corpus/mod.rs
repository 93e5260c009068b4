//! Job-taxonomy corpus and similarity search.

pub mod error;
pub mod memory;
pub mod model;
pub mod qdrant;

#[cfg(test)]
mod tests;

pub use error::CorpusError;
pub use memory::MemoryCorpus;
pub use model::{Candidate, ReferenceJob, RetrievalFilters, cosine_similarity};
pub use qdrant::QdrantCorpus;

pub const DEFAULT_COLLECTION_NAME: &str = "payband_reference_jobs";

/// Similarity search over reference jobs.
///
/// Results are ordered by descending cosine similarity; equal scores keep corpus
/// insertion order. An empty corpus, or filters that exclude everything, yield an
/// empty list rather than an error.
pub trait CorpusIndex: Send + Sync {
    fn search(
        &self,
        query: &[f32],
        top_k: usize,
        filters: &RetrievalFilters,
    ) -> impl std::future::Future<Output = Result<Vec<Candidate>, CorpusError>> + Send;

    /// Vector dimension stored in this index.
    fn dimension(&self) -> usize;
}
