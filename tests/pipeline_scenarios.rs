//! End-to-end resolution and pricing scenarios against in-memory collaborators.

mod common;

use payband::arbitration::ScriptedArbiter;
use payband::{
    ConfidenceLevel, EngineConfig, EngineError, JobPricingDraft, JobPricingRequest, MatchMethod,
    MemoryCorpus, Money, ParamCategory, ParameterSet, PricingConfig, PricingError, RequestStatus,
    UnmatchedPricingMode, UnresolvedLocationPolicy, ValidationError,
};

use common::{DATA_SCIENCE_DESCRIPTION, DIM, build_engine, seeded_engine};

fn scenario_a_request() -> JobPricingRequest {
    JobPricingDraft::new("Senior Data Scientist", DATA_SCIENCE_DESCRIPTION)
        .experience(5.0, 10.0)
        .industry("Technology")
        .location("Singapore")
        .validate()
        .expect("valid request")
}

fn structural_only() -> EngineConfig {
    EngineConfig {
        unmatched: UnmatchedPricingMode::StructuralOnly,
        ..Default::default()
    }
}

fn with_location_policy(policy: UnresolvedLocationPolicy) -> EngineConfig {
    EngineConfig {
        pricing: PricingConfig::default().with_unresolved_location(policy),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_scenario_a_senior_data_scientist() {
    let t = seeded_engine(EngineConfig::default(), ScriptedArbiter::matching(0, 0.9));
    let request = scenario_a_request();

    let outcome = t.engine.resolve_and_price(&request).await.unwrap();

    assert_eq!(outcome.match_result.reference_code.as_deref(), Some("DS-301"));
    assert_eq!(outcome.match_result.method, MatchMethod::LlmArbitrated);
    assert!((outcome.match_result.confidence - 0.9).abs() < 1e-6);

    let pricing = outcome.pricing.as_ref().unwrap();
    assert!((pricing.breakdown.experience_multiplier - 1.225).abs() < 1e-12);
    assert_eq!(pricing.target_salary, Money::from_major(147_000));
    assert_eq!(pricing.recommended_min, Money::from_major(117_600));
    assert_eq!(pricing.recommended_max, Money::from_major(176_400));
    assert_eq!(pricing.percentiles.p50, Money::from_major(147_000));
    assert_eq!(pricing.parameter_version, "2026-q3");
    assert_eq!(pricing.confidence_level, ConfidenceLevel::High);

    assert_eq!(
        t.sink.latest_status(request.id()),
        Some(RequestStatus::Completed)
    );
}

#[tokio::test]
async fn test_scenario_b_empty_corpus_requires_match() {
    let t = build_engine(
        EngineConfig::default(),
        MemoryCorpus::new(DIM),
        ScriptedArbiter::matching(0, 0.9),
    );
    let request = scenario_a_request();

    let err = t.engine.resolve_and_price(&request).await.unwrap_err();

    let result = match err {
        EngineError::NoMatch(result) => result,
        other => panic!("expected NoMatch, got {other:?}"),
    };
    assert!(result.reference_code.is_none());
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.method, MatchMethod::None);
    assert_eq!(t.arbiter.call_count(), 0);
    let recorded = t.sink.outcome(request.id()).unwrap();
    assert!(recorded.pricing.is_none());
    assert_eq!(recorded.match_result, *result);
    assert_eq!(t.sink.latest_status(request.id()), Some(RequestStatus::Failed));
}

#[tokio::test]
async fn test_scenario_b_empty_corpus_structural_pricing() {
    let t = build_engine(
        structural_only(),
        MemoryCorpus::new(DIM),
        ScriptedArbiter::matching(0, 0.9),
    );

    let outcome = t.engine.resolve_and_price(&scenario_a_request()).await.unwrap();

    assert!(!outcome.is_matched());
    assert_eq!(outcome.match_result.confidence, 0.0);
    let pricing = outcome.pricing.as_ref().unwrap();
    assert_eq!(pricing.target_salary, Money::from_major(147_000));
    assert!(outcome.rationale.starts_with("No reference job matched"));
}

#[tokio::test]
async fn test_scenario_b_structural_pricing_needs_experience() {
    let t = build_engine(
        structural_only(),
        MemoryCorpus::new(DIM),
        ScriptedArbiter::new(),
    );
    let request = JobPricingDraft::new("Senior Data Scientist", DATA_SCIENCE_DESCRIPTION)
        .validate()
        .unwrap();

    let err = t.engine.resolve_and_price(&request).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::ExperienceUnresolved)
    ));
}

#[tokio::test]
async fn test_scenario_c_low_confidence_is_unmatched() {
    let t = seeded_engine(EngineConfig::default(), ScriptedArbiter::matching(0, 0.65));

    let err = t.engine.resolve_and_price(&scenario_a_request()).await.unwrap_err();

    let result = match err {
        EngineError::NoMatch(result) => result,
        other => panic!("expected NoMatch, got {other:?}"),
    };
    assert!(result.reference_code.is_none());
    assert!(result.similarity > 0.5);
    assert_eq!(t.arbiter.call_count(), 1);
}

#[tokio::test]
async fn test_scenario_c_low_confidence_priced_structurally() {
    let t = seeded_engine(structural_only(), ScriptedArbiter::matching(0, 0.65));

    let outcome = t.engine.resolve_and_price(&scenario_a_request()).await.unwrap();

    assert!(!outcome.is_matched());
    assert_eq!(outcome.match_result.method, MatchMethod::None);
    assert!(outcome.rationale.contains("from structural attributes only"));
}

#[tokio::test]
async fn test_scenario_d_unknown_location_fails_fast() {
    let t = seeded_engine(
        with_location_policy(UnresolvedLocationPolicy::FailFast),
        ScriptedArbiter::matching(0, 0.9),
    );
    let request = JobPricingDraft::new("Senior Data Scientist", DATA_SCIENCE_DESCRIPTION)
        .experience(5.0, 10.0)
        .location("Atlantis")
        .validate()
        .unwrap();

    let err = t.engine.resolve_and_price(&request).await.unwrap_err();

    match err {
        EngineError::Pricing(PricingError::ParameterNotFound { category, key }) => {
            assert_eq!(category, ParamCategory::LocationIndex);
            assert_eq!(key, "atlantis");
        }
        other => panic!("expected ParameterNotFound, got {other:?}"),
    }
    assert_eq!(t.sink.outcome_count(), 0);
}

#[tokio::test]
async fn test_scenario_d_unknown_location_neutral_policy() {
    let t = seeded_engine(
        with_location_policy(UnresolvedLocationPolicy::Neutral),
        ScriptedArbiter::matching(0, 0.9),
    );
    let request = JobPricingDraft::new("Senior Data Scientist", DATA_SCIENCE_DESCRIPTION)
        .experience(5.0, 10.0)
        .location("Atlantis")
        .validate()
        .unwrap();

    let outcome = t.engine.resolve_and_price(&request).await.unwrap();
    let pricing = outcome.pricing.unwrap();

    assert!(pricing.breakdown.location.fallback);
    assert_eq!(pricing.breakdown.location.value, 1.0);
    assert_eq!(pricing.target_salary, Money::from_major(147_000));
}

#[tokio::test]
async fn test_missing_band_is_parameter_not_found() {
    let t = seeded_engine(EngineConfig::default(), ScriptedArbiter::matching(0, 0.9));
    t.store
        .publish(
            ParameterSet::new("2026-q4")
                .band("mid", 100_000.0, 140_000.0)
                .factor(ParamCategory::IndustryAdjustment, "default", 1.0)
                .factor(ParamCategory::CompanySizeFactor, "default", 1.0)
                .factor(ParamCategory::LocationIndex, "Singapore", 1.0),
        )
        .unwrap();

    let err = t.engine.resolve_and_price(&scenario_a_request()).await.unwrap_err();

    match err {
        EngineError::Pricing(PricingError::ParameterNotFound { category, key }) => {
            assert_eq!(category, ParamCategory::SalaryBand);
            assert_eq!(key, "senior");
        }
        other => panic!("expected ParameterNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_replay_is_byte_identical() {
    let t = seeded_engine(EngineConfig::default(), ScriptedArbiter::matching(0, 0.9));
    let request = scenario_a_request();

    let first = t.engine.resolve_and_price(&request).await.unwrap();
    let second = t.engine.resolve_and_price(&request).await.unwrap();

    assert_eq!(first, second);
    let (a, b) = (first.pricing.unwrap(), second.pricing.unwrap());
    assert_eq!(
        serde_json::to_vec(&a).unwrap(),
        serde_json::to_vec(&b).unwrap()
    );
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    assert_eq!(t.sink.outcome_count(), 1);
}

#[tokio::test]
async fn test_band_and_confidence_invariants_hold_across_requests() {
    let t = seeded_engine(structural_only(), ScriptedArbiter::matching(0, 0.9));
    let skills = ["Python", "Rust", "Kubernetes", "COBOL"];

    for (years, location) in [(0.5, "London"), (3.0, "Singapore"), (6.0, "London"), (40.0, "Singapore")] {
        for skill_count in 0..=skills.len() {
            let request = JobPricingDraft::new("Senior Data Scientist", "Models.")
                .experience(years, years)
                .location(location)
                .skills(skills[..skill_count].iter().copied())
                .validate()
                .unwrap();

            let outcome = t.engine.resolve_and_price(&request).await.unwrap();
            let p = outcome.pricing.unwrap();

            assert!(p.recommended_min <= p.target_salary);
            assert!(p.target_salary <= p.recommended_max);
            assert!(p.confidence_score <= 100);
            assert!(p.breakdown.skill_premium <= 0.50);
            assert!(p.breakdown.experience_multiplier <= 1.45);
            let expected_level = match p.confidence_score {
                85..=100 => ConfidenceLevel::High,
                70..=84 => ConfidenceLevel::Medium,
                _ => ConfidenceLevel::Low,
            };
            assert_eq!(p.confidence_level, expected_level);
        }
    }
}

#[tokio::test]
async fn test_metrics_track_outcomes() {
    let t = seeded_engine(EngineConfig::default(), ScriptedArbiter::matching(0, 0.9));

    t.engine.resolve_and_price(&scenario_a_request()).await.unwrap();
    let _ = t
        .engine
        .price_draft(JobPricingDraft::new("", "blank title"))
        .await;

    let metrics = t.engine.metrics();
    assert_eq!(metrics.requests, 2);
    assert_eq!(metrics.completed, 1);
    assert_eq!(metrics.matched, 1);
    assert_eq!(metrics.validation_failures, 1);
    assert_eq!(metrics.failed(), 1);
    assert_eq!(
        metrics.requests,
        metrics.completed + metrics.replayed + metrics.failed()
    );
}
