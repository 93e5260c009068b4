use std::collections::BTreeSet;

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::arbitration::MatchMethod;
use crate::corpus::{Candidate, ReferenceJob};
use crate::pricing::{
    AppliedFactor, ExperienceBucket, PricingCalculator, PricingConfig, ResolvedFactors,
};
use crate::request::{RequestRecord, RequestStatus, StatusTransitionError};

fn candidate() -> Candidate {
    Candidate {
        job: ReferenceJob::new("DS-3", "Senior Data Scientist", "Data", "senior", "Models"),
        similarity: 0.93,
    }
}

fn pricing() -> PricingResult {
    let factors = ResolvedFactors {
        bucket: ExperienceBucket::Senior,
        years: 7.5,
        band_min: 100_000.0,
        band_max: 140_000.0,
        location: AppliedFactor::baseline(),
        matched_skills: Vec::new(),
        unmatched_skills: Vec::new(),
        industry: AppliedFactor::baseline(),
        company_size: AppliedFactor::baseline(),
        experience_given: true,
        location_given: false,
        description_chars: 20,
        versions: BTreeSet::from(["v1".to_string()]),
    };
    PricingCalculator::new(PricingConfig::default())
        .unwrap()
        .compute(&factors)
        .unwrap()
}

#[test]
fn test_assemble_matched_and_priced() {
    let id = Uuid::new_v4();
    let match_result =
        MatchResult::matched(id, &candidate(), 0.88, "same role", MatchMethod::LlmArbitrated);
    let outcome = ResultAssembler::new().assemble(match_result, Some(pricing()));

    assert_eq!(outcome.request_id, id);
    assert!(outcome.is_matched());
    assert!(outcome.is_priced());
    assert!(
        outcome
            .rationale
            .starts_with("Matched to Senior Data Scientist (DS-3) by llm_arbitrated")
    );
    assert!(outcome.rationale.contains("USD 117600.00 to 176400.00 annual"));
    assert!(outcome.rationale.contains("parameters v1"));
}

#[test]
fn test_assemble_structural_only() {
    let id = Uuid::new_v4();
    let outcome = ResultAssembler::new().assemble(
        MatchResult::unmatched(id, 0.0, "no candidates retrieved"),
        Some(pricing()),
    );
    assert!(!outcome.is_matched());
    assert!(outcome.rationale.contains("No reference job matched: no candidates retrieved"));
    assert!(outcome.rationale.contains("from structural attributes only"));
}

#[test]
fn test_assemble_unpriced() {
    let outcome = ResultAssembler::new().assemble(
        MatchResult::unmatched(Uuid::nil(), 0.4, "nothing close"),
        None,
    );
    assert!(outcome.rationale.ends_with("Not priced."));
}

#[test]
fn test_assemble_is_reproducible() {
    let id = Uuid::new_v4();
    let build = || {
        ResultAssembler::new().assemble(
            MatchResult::matched(id, &candidate(), 0.9, "r", MatchMethod::EmbeddingOnly),
            Some(pricing()),
        )
    };
    assert_eq!(
        serde_json::to_vec(&build()).unwrap(),
        serde_json::to_vec(&build()).unwrap()
    );
}

#[tokio::test]
async fn test_sink_rejects_different_second_outcome() {
    let sink = MemoryResultSink::new();
    let id = Uuid::new_v4();
    let first = ResultAssembler::new().assemble(
        MatchResult::matched(id, &candidate(), 0.9, "r", MatchMethod::LlmArbitrated),
        Some(pricing()),
    );
    sink.record_outcome(&first).await.unwrap();

    // Identical replay is accepted.
    sink.record_outcome(&first).await.unwrap();
    assert_eq!(sink.outcome_count(), 1);

    let second = ResultAssembler::new().assemble(
        MatchResult::unmatched(id, 0.1, "changed my mind"),
        None,
    );
    assert_eq!(
        sink.record_outcome(&second).await,
        Err(SinkError::AlreadyRecorded { request_id: id })
    );
    assert_eq!(sink.outcome(id), Some(first));
}

#[tokio::test]
async fn test_sink_status_history() {
    let sink = MemoryResultSink::new();
    let id = Uuid::new_v4();
    let mut record = RequestRecord::new(id, Utc::now());
    sink.record_status(&record).await.unwrap();
    record.start_processing(Utc::now()).unwrap();
    sink.record_status(&record).await.unwrap();
    record.complete(Utc::now()).unwrap();
    sink.record_status(&record).await.unwrap();

    let statuses: Vec<_> = sink.status_history(id).iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            RequestStatus::Pending,
            RequestStatus::Processing,
            RequestStatus::Completed
        ]
    );
    assert_eq!(sink.latest_status(id), Some(RequestStatus::Completed));
}

#[tokio::test]
async fn test_sink_rejects_reopening_finished_request() {
    let sink = MemoryResultSink::new();
    let id = Uuid::new_v4();
    let mut record = RequestRecord::new(id, Utc::now());
    sink.record_status(&record).await.unwrap();
    record.start_processing(Utc::now()).unwrap();
    sink.record_status(&record).await.unwrap();
    record.fail(Utc::now(), "arbitration failed").unwrap();
    sink.record_status(&record).await.unwrap();

    let restart = RequestRecord::new(id, Utc::now());
    assert_eq!(
        sink.record_status(&restart).await,
        Err(SinkError::Transition(StatusTransitionError {
            request_id: id,
            from: RequestStatus::Failed,
            to: RequestStatus::Pending,
        }))
    );
    assert_eq!(sink.status_history(id).len(), 3);
    let latest = sink.latest_record(id).await.unwrap().unwrap();
    assert_eq!(latest.status, RequestStatus::Failed);
    assert_eq!(latest.error.as_deref(), Some("arbitration failed"));
}

#[tokio::test]
async fn test_sink_rejects_second_pending_while_in_flight() {
    let sink = MemoryResultSink::new();
    let id = Uuid::new_v4();
    sink.record_status(&RequestRecord::new(id, Utc::now()))
        .await
        .unwrap();

    let duplicate = sink.record_status(&RequestRecord::new(id, Utc::now())).await;
    assert!(matches!(duplicate, Err(SinkError::Transition(_))));
    assert!(sink.latest_record(Uuid::new_v4()).await.unwrap().is_none());
    assert!(sink.stored_outcome(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_sink_unavailable() {
    let sink = MemoryResultSink::new();
    sink.set_unavailable(true);
    let record = RequestRecord::new(Uuid::new_v4(), Utc::now());
    assert!(matches!(
        sink.record_status(&record).await,
        Err(SinkError::Unavailable { .. })
    ));
}
