//! End-to-end resolution and pricing of one request.
//!
//! ```text
//! request -> normalize -> embed -> retrieve top-K -> arbitrate -> price -> assemble -> sink
//! ```
//!
//! Each stage either hands a value to the next or ends the request with a typed
//! [`EngineError`]. The outcome reaches the [`ResultSink`] only after every stage
//! succeeded, except that an unmatched request in [`UnmatchedPricingMode::RequireMatch`]
//! still records its unpriced match. Status changes are recorded on the way.
//!
//! A request id is processed at most once. Resubmitting a completed request returns
//! the recorded outcome; resubmitting a failed one is a lifecycle error.

mod cancel;
mod config;
mod error;
mod metrics;


use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::arbitration::{
    ArbitrationBackend, ArbitrationError, ArbitrationOutcome, ArbitrationSelector, MatchMethod,
    MatchResult, embedding_only_outcome,
};
use crate::assembler::{PricingOutcome, ResultAssembler, ResultSink};
use crate::corpus::{Candidate, CorpusIndex, RetrievalFilters};
use crate::normalize::normalize;
use crate::params::ParameterCache;
use crate::pricing::{PricingCalculator, PricingInputs};
use crate::request::{
    JobPricingDraft, JobPricingRequest, RequestRecord, RequestStatus, StatusTransitionError,
};
use crate::retrieval::CandidateRetriever;

pub use cancel::CancellationFlag;
pub use config::{EngineConfig, UnmatchedPricingMode};
pub use error::EngineError;
pub use metrics::{EngineMetrics, EngineMetricsSnapshot};

/// Owns one instance of every pipeline stage.
///
/// Requests share nothing but the parameter cache and the sink, so concurrent calls
/// on one engine are independent.
pub struct ResolutionEngine<I: CorpusIndex> {
    retriever: CandidateRetriever<I>,
    selector: Option<ArbitrationSelector>,
    config: EngineConfig,
    calculator: PricingCalculator,
    cache: Arc<ParameterCache>,
    assembler: ResultAssembler,
    sink: Arc<dyn ResultSink>,
    metrics: EngineMetrics,
}

impl<I: CorpusIndex> ResolutionEngine<I> {
    /// `arbiter` is only consulted when `config.arbitration.enabled` is set.
    pub fn new(
        config: EngineConfig,
        retriever: CandidateRetriever<I>,
        arbiter: Arc<dyn ArbitrationBackend>,
        cache: Arc<ParameterCache>,
        sink: Arc<dyn ResultSink>,
    ) -> Result<Self, EngineError> {
        config
            .arbitration
            .validate()
            .map_err(|e| EngineError::InvalidConfig {
                reason: e.to_string(),
            })?;
        let calculator =
            PricingCalculator::new(config.pricing.clone()).map_err(|e| EngineError::InvalidConfig {
                reason: e.to_string(),
            })?;

        let selector = if config.arbitration.enabled {
            Some(
                ArbitrationSelector::new(arbiter, config.arbitration.clone()).map_err(|e| {
                    EngineError::InvalidConfig {
                        reason: e.to_string(),
                    }
                })?,
            )
        } else {
            None
        };

        info!(
            arbitration = config.arbitration.enabled,
            unmatched = config.unmatched.as_str(),
            top_k = retriever.config().top_k,
            "Resolution engine ready"
        );

        Ok(Self {
            retriever,
            selector,
            config,
            calculator,
            cache,
            assembler: ResultAssembler::new(),
            sink,
            metrics: EngineMetrics::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> EngineMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn cache(&self) -> &Arc<ParameterCache> {
        &self.cache
    }

    /// Validates `draft` and prices it. Invalid drafts never reach the sink.
    pub async fn price_draft(&self, draft: JobPricingDraft) -> Result<PricingOutcome, EngineError> {
        self.metrics.record_request();
        let request = match draft.validate() {
            Ok(request) => request,
            Err(error) => {
                let error = EngineError::from(error);
                self.metrics.record_failure(&error);
                return Err(error);
            }
        };
        self.process(&request, &CancellationFlag::new()).await
    }

    pub async fn resolve_and_price(
        &self,
        request: &JobPricingRequest,
    ) -> Result<PricingOutcome, EngineError> {
        self.resolve_and_price_with_cancel(request, &CancellationFlag::new())
            .await
    }

    /// Runs the whole pipeline, checking `cancel` between stages.
    ///
    /// A cancelled request ends as `Failed` and nothing is written for it.
    pub async fn resolve_and_price_with_cancel(
        &self,
        request: &JobPricingRequest,
        cancel: &CancellationFlag,
    ) -> Result<PricingOutcome, EngineError> {
        self.metrics.record_request();
        self.process(request, cancel).await
    }

    #[instrument(skip_all, fields(request_id = %request.id()))]
    async fn process(
        &self,
        request: &JobPricingRequest,
        cancel: &CancellationFlag,
    ) -> Result<PricingOutcome, EngineError> {
        match self.recorded_outcome(request.id()).await {
            Ok(Some(outcome)) => {
                self.metrics.record_replay();
                debug!("Request already completed; returning recorded outcome");
                return Ok(outcome);
            }
            Ok(None) => {}
            Err(error) => {
                self.metrics.record_failure(&error);
                warn!(kind = error.kind(), error = %error, "Request not started");
                return Err(error);
            }
        }

        let mut record = RequestRecord::new(request.id(), Utc::now());
        let started = async {
            self.sink.record_status(&record).await?;
            record.start_processing(Utc::now())?;
            self.sink.record_status(&record).await?;
            Ok::<_, EngineError>(())
        }
        .await;
        if let Err(error) = started {
            self.metrics.record_failure(&error);
            return Err(error);
        }

        let result = match self.run_pipeline(request, cancel).await {
            Ok(outcome) => match self.sink.record_outcome(&outcome).await {
                Ok(()) => Ok(outcome),
                Err(error) => Err(EngineError::from(error)),
            },
            Err(EngineError::NoMatch(match_result)) => {
                let unpriced = self.assembler.assemble((*match_result).clone(), None);
                match self.sink.record_outcome(&unpriced).await {
                    Ok(()) => Err(EngineError::NoMatch(match_result)),
                    Err(error) => Err(EngineError::from(error)),
                }
            }
            Err(error) => Err(error),
        };

        match result {
            Ok(outcome) => {
                record.complete(Utc::now())?;
                if let Err(error) = self.sink.record_status(&record).await {
                    warn!(error = %error, "Failed to record completion status");
                }
                self.metrics.record_completed(outcome.is_matched());
                info!(
                    matched = outcome.is_matched(),
                    code = outcome.match_result.reference_code.as_deref(),
                    target_minor = outcome.pricing.as_ref().map(|p| p.target_salary.minor_units()),
                    "Request priced"
                );
                Ok(outcome)
            }
            Err(error) => {
                self.metrics.record_failure(&error);
                warn!(kind = error.kind(), error = %error, "Request failed");
                record.fail(Utc::now(), error.to_string())?;
                if let Err(sink_error) = self.sink.record_status(&record).await {
                    warn!(error = %sink_error, "Failed to record failure status");
                }
                Err(error)
            }
        }
    }

    /// Outcome of an earlier completed run of this request id. `Ok(None)` means the id
    /// is new; any other prior state cannot be restarted.
    async fn recorded_outcome(&self, request_id: Uuid) -> Result<Option<PricingOutcome>, EngineError> {
        let Some(previous) = self.sink.latest_record(request_id).await? else {
            return Ok(None);
        };
        if previous.status == RequestStatus::Completed {
            if let Some(outcome) = self.sink.stored_outcome(request_id).await? {
                return Ok(Some(outcome));
            }
        }
        Err(EngineError::Lifecycle(StatusTransitionError {
            request_id,
            from: previous.status,
            to: RequestStatus::Pending,
        }))
    }

    async fn run_pipeline(
        &self,
        request: &JobPricingRequest,
        cancel: &CancellationFlag,
    ) -> Result<PricingOutcome, EngineError> {
        checkpoint(cancel)?;
        let query = normalize(request);
        debug!(query_chars = query.chars().count(), "Normalized request");

        let embedding = self.retriever.embed_query(&query).await?;
        checkpoint(cancel)?;

        let filters = self.filters_for(request);
        let candidates = self
            .retriever
            .retrieve(&embedding, self.retriever.config().top_k, &filters)
            .await?;
        checkpoint(cancel)?;

        let outcome = match &self.selector {
            Some(selector) => selector.arbitrate(&query, &candidates).await,
            None => embedding_only_outcome(
                &candidates,
                self.config.arbitration.embedding_only_min_similarity,
            ),
        };
        checkpoint(cancel)?;
        debug!(outcome = outcome.debug_status(), "Arbitration finished");

        let (match_result, matched) = self.match_result(request, &candidates, outcome)?;
        self.metrics.record_match(matched.is_some());
        debug!(
            matched = matched.is_some(),
            method = match_result.method.as_str(),
            "Resolution finished"
        );

        if matched.is_none() && self.config.unmatched == UnmatchedPricingMode::RequireMatch {
            return Err(EngineError::NoMatch(Box::new(match_result)));
        }

        let reference_level = matched.map(|c| c.job.career_level.as_str());
        let inputs = PricingInputs::from_request(request, reference_level)?;
        let pricing = self.calculator.price(&inputs, &self.cache).await?;
        checkpoint(cancel)?;

        Ok(self.assembler.assemble(match_result, Some(pricing)))
    }

    fn filters_for(&self, request: &JobPricingRequest) -> RetrievalFilters {
        if !self.config.filter_by_hints {
            return RetrievalFilters::none();
        }
        let mut filters = RetrievalFilters::none();
        if let Some(family) = request.family_hint() {
            filters = filters.family(family);
        }
        if let Some(level) = request.level_hint() {
            filters = filters.career_level(level);
        }
        filters
    }

    fn match_result<'c>(
        &self,
        request: &JobPricingRequest,
        candidates: &'c [Candidate],
        outcome: ArbitrationOutcome,
    ) -> Result<(MatchResult, Option<&'c Candidate>), EngineError> {
        let best_similarity = candidates.first().map_or(0.0, |c| c.similarity);
        let method = if self.selector.is_some() {
            MatchMethod::LlmArbitrated
        } else {
            MatchMethod::EmbeddingOnly
        };

        match outcome {
            ArbitrationOutcome::Matched {
                index,
                confidence,
                rationale,
            } => {
                let candidate =
                    candidates
                        .get(index)
                        .ok_or(ArbitrationError::IndexOutOfRange {
                            index,
                            candidates: candidates.len(),
                        })?;
                Ok((
                    MatchResult::matched(request.id(), candidate, confidence, rationale, method),
                    Some(candidate),
                ))
            }
            ArbitrationOutcome::NoMatch { reason } => Ok((
                MatchResult::unmatched(request.id(), best_similarity, reason),
                None,
            )),
            ArbitrationOutcome::CallFailed { error } => Err(EngineError::Arbitration(error)),
        }
    }
}

fn checkpoint(cancel: &CancellationFlag) -> Result<(), EngineError> {
    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }
    Ok(())
}
