use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    PointsIdsList, ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder, Value,
    VectorParamsBuilder,
};
use tracing::{debug, info, instrument};

use super::{Candidate, CorpusError, CorpusIndex, ReferenceJob, RetrievalFilters};
use crate::hashing::reference_point_id;

const FIELD_CODE: &str = "code";
const FIELD_TITLE: &str = "title";
const FIELD_FAMILY: &str = "family";
const FIELD_FAMILY_KEY: &str = "family_key";
const FIELD_LEVEL: &str = "career_level";
const FIELD_LEVEL_KEY: &str = "career_level_key";
const FIELD_DESCRIPTION: &str = "description";
const FIELD_SEQ: &str = "seq";

/// Extra results fetched beyond `top_k` so equal scores at the cut can be re-ordered.
const TIE_WINDOW: usize = 8;

#[derive(Clone)]
/// Corpus stored in a Qdrant collection with cosine distance.
///
/// Each point's payload carries the reference-job fields plus an insertion
/// sequence number used to break score ties deterministically.
pub struct QdrantCorpus {
    client: Qdrant,
    url: String,
    collection: String,
    dimension: usize,
}

impl QdrantCorpus {
    pub fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, CorpusError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| CorpusError::ConnectionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            url: url.to_string(),
            collection: collection.to_string(),
            dimension,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Creates the collection if it does not exist yet.
    pub async fn ensure_collection(&self) -> Result<(), CorpusError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| self.collection_error(e))?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| self.collection_error(e))?;
            info!(collection = %self.collection, dimension = self.dimension, "Created corpus collection");
        }
        Ok(())
    }

    /// Upserts jobs. `first_seq` is the insertion sequence of `jobs[0]`; later jobs
    /// get consecutive numbers.
    pub async fn upsert(&self, first_seq: u64, jobs: &[ReferenceJob]) -> Result<(), CorpusError> {
        if jobs.is_empty() {
            return Ok(());
        }

        let mut points = Vec::with_capacity(jobs.len());
        for (offset, job) in jobs.iter().enumerate() {
            if job.embedding.len() != self.dimension {
                return Err(CorpusError::DimensionMismatch {
                    expected: self.dimension,
                    actual: job.embedding.len(),
                });
            }
            let payload = job_payload(job, first_seq + offset as u64);
            points.push(PointStruct::new(
                reference_point_id(&job.code),
                job.embedding.clone(),
                payload,
            ));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| CorpusError::UpsertFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        debug!(count = jobs.len(), first_seq, "Upserted reference jobs");
        Ok(())
    }

    pub async fn remove(&self, codes: &[&str]) -> Result<(), CorpusError> {
        if codes.is_empty() {
            return Ok(());
        }
        let selector = PointsIdsList {
            ids: codes
                .iter()
                .map(|code| reference_point_id(code).into())
                .collect(),
        };
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(selector)
                    .wait(true),
            )
            .await
            .map_err(|e| CorpusError::DeleteFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn collection_error(&self, e: impl std::fmt::Display) -> CorpusError {
        CorpusError::CollectionFailed {
            collection: self.collection.clone(),
            message: e.to_string(),
        }
    }
}

impl CorpusIndex for QdrantCorpus {
    #[instrument(skip(self, query), fields(collection = %self.collection))]
    async fn search(
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

        let limit = top_k.saturating_add(TIE_WINDOW) as u64;
        let mut builder = SearchPointsBuilder::new(&self.collection, query.to_vec(), limit)
            .with_payload(true);
        if let Some(filter) = build_filter(filters) {
            builder = builder.filter(filter);
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| CorpusError::SearchFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let mut ranked: Vec<(u64, Candidate)> = response
            .result
            .into_iter()
            .filter_map(candidate_from_point)
            .collect();

        ranked.sort_by(|(seq_a, a), (seq_b, b)| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(seq_a.cmp(seq_b))
        });
        ranked.truncate(top_k);

        Ok(ranked.into_iter().map(|(_, c)| c).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn job_payload(job: &ReferenceJob, seq: u64) -> HashMap<String, Value> {
    let mut payload: HashMap<String, Value> = HashMap::new();
    payload.insert(FIELD_CODE.to_string(), job.code.clone().into());
    payload.insert(FIELD_TITLE.to_string(), job.title.clone().into());
    payload.insert(FIELD_FAMILY.to_string(), job.family.clone().into());
    payload.insert(FIELD_FAMILY_KEY.to_string(), job.family.to_lowercase().into());
    payload.insert(FIELD_LEVEL.to_string(), job.career_level.clone().into());
    payload.insert(
        FIELD_LEVEL_KEY.to_string(),
        job.career_level.to_lowercase().into(),
    );
    payload.insert(FIELD_DESCRIPTION.to_string(), job.description.clone().into());
    payload.insert(FIELD_SEQ.to_string(), (seq as i64).into());
    payload
}

fn build_filter(filters: &RetrievalFilters) -> Option<Filter> {
    let mut conditions = Vec::new();
    if let Some(family) = &filters.family {
        conditions.push(Condition::matches(FIELD_FAMILY_KEY, family.to_lowercase()));
    }
    if let Some(level) = &filters.career_level {
        conditions.push(Condition::matches(FIELD_LEVEL_KEY, level.to_lowercase()));
    }
    if conditions.is_empty() {
        None
    } else {
        Some(Filter::must(conditions))
    }
}

fn candidate_from_point(point: ScoredPoint) -> Option<(u64, Candidate)> {
    match point.id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Num(_)) => {}
        _ => return None,
    }

    let payload = point.payload;
    let text = |field: &str| {
        payload
            .get(field)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    let code = text(FIELD_CODE)?;
    let seq = payload
        .get(FIELD_SEQ)
        .and_then(|v| v.as_integer())
        .map(|i| i as u64)
        .unwrap_or(u64::MAX);

    let job = ReferenceJob::new(
        code,
        text(FIELD_TITLE).unwrap_or_default(),
        text(FIELD_FAMILY).unwrap_or_default(),
        text(FIELD_LEVEL).unwrap_or_default(),
        text(FIELD_DESCRIPTION).unwrap_or_default(),
    );

    Some((
        seq,
        Candidate {
            job,
            similarity: point.score,
        },
    ))
}
