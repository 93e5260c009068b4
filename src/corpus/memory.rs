use parking_lot::RwLock;
use tracing::debug;

use super::{Candidate, CorpusError, CorpusIndex, ReferenceJob, RetrievalFilters, cosine_similarity};

/// In-process corpus with an exact cosine scan.
///
/// Jobs live in insertion order; upserting an existing code replaces it in place so
/// its tie-break position is stable.
pub struct MemoryCorpus {
    dimension: usize,
    jobs: RwLock<Vec<ReferenceJob>>,
}

impl MemoryCorpus {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            jobs: RwLock::new(Vec::new()),
        }
    }

    /// Inserts or replaces jobs by code. The batch is validated before any write.
    pub fn upsert(&self, jobs: impl IntoIterator<Item = ReferenceJob>) -> Result<(), CorpusError> {
        let jobs: Vec<ReferenceJob> = jobs.into_iter().collect();
        for job in &jobs {
            if job.code.trim().is_empty() {
                return Err(CorpusError::InvalidReferenceJob {
                    code: job.code.clone(),
                    reason: "code must not be empty".to_string(),
                });
            }
            if job.embedding.len() != self.dimension {
                return Err(CorpusError::DimensionMismatch {
                    expected: self.dimension,
                    actual: job.embedding.len(),
                });
            }
        }

        let mut stored = self.jobs.write();
        for job in jobs {
            match stored.iter_mut().find(|j| j.code == job.code) {
                Some(existing) => *existing = job,
                None => stored.push(job),
            }
        }
        Ok(())
    }

    /// Removes a job; returns whether it was present.
    pub fn remove(&self, code: &str) -> bool {
        let mut stored = self.jobs.write();
        let before = stored.len();
        stored.retain(|j| j.code != code);
        stored.len() != before
    }

    pub fn get(&self, code: &str) -> Option<ReferenceJob> {
        self.jobs.read().iter().find(|j| j.code == code).cloned()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    fn search_sync(
        &self,
        query: &[f32],
        top_k: usize,
        filters: &RetrievalFilters,
    ) -> Result<Vec<Candidate>, CorpusError> {
        if query.len() != self.dimension {
            return Err(CorpusError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let stored = self.jobs.read();
        let mut results: Vec<Candidate> = stored
            .iter()
            .filter(|job| filters.accepts(job))
            .map(|job| Candidate {
                similarity: cosine_similarity(query, &job.embedding),
                job: job.clone(),
            })
            .collect();
        drop(stored);

        // sort_by is stable: equal scores keep insertion order.
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        debug!(
            returned = results.len(),
            top_k,
            filtered = !filters.is_empty(),
            "Memory corpus search"
        );
        Ok(results)
    }
}

impl CorpusIndex for MemoryCorpus {
    async fn search(
        &self,
        query: &[f32],
        top_k: usize,
        filters: &RetrievalFilters,
    ) -> Result<Vec<Candidate>, CorpusError> {
        self.search_sync(query, top_k, filters)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
