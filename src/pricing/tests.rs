use std::collections::BTreeSet;
use std::sync::Arc;

use super::*;
use crate::params::{
    MemoryParameterStore, ParamCategory, ParameterCache, ParameterCacheConfig, ParameterSet,
};
use crate::request::{JobPricingDraft, ValidationError};

const LONG_DESCRIPTION: &str = "Builds statistical and machine learning models for demand \
forecasting, partners with product teams, and owns experimentation design end to end.";

fn seeded_params() -> ParameterSet {
    ParameterSet::new("2026-q3")
        .band("entry", 50_000.0, 70_000.0)
        .band("junior", 65_000.0, 85_000.0)
        .band("mid", 80_000.0, 110_000.0)
        .band("senior", 100_000.0, 140_000.0)
        .factor(ParamCategory::IndustryAdjustment, "default", 1.0)
        .factor(ParamCategory::IndustryAdjustment, "Technology", 1.0)
        .factor(ParamCategory::IndustryAdjustment, "Finance", 1.10)
        .factor(ParamCategory::CompanySizeFactor, "default", 1.0)
        .factor(ParamCategory::CompanySizeFactor, "enterprise", 1.05)
        .factor(ParamCategory::LocationIndex, "Singapore", 1.0)
        .factor(ParamCategory::LocationIndex, "San Francisco", 1.25)
        .factor(ParamCategory::SkillPremium, "rust", 0.30)
        .factor(ParamCategory::SkillPremium, "kubernetes", 0.30)
        .factor(ParamCategory::SkillPremium, "sql", 0.05)
}

fn cache_for(set: ParameterSet) -> ParameterCache {
    let store = Arc::new(MemoryParameterStore::new(set).unwrap());
    ParameterCache::new(store, ParameterCacheConfig::default()).unwrap()
}

fn calculator() -> PricingCalculator {
    PricingCalculator::new(PricingConfig::default()).unwrap()
}

fn inputs(years: f64) -> PricingInputs {
    PricingInputs {
        years,
        experience_given: true,
        location: None,
        skills: Vec::new(),
        industry: None,
        company_size: None,
        description_chars: LONG_DESCRIPTION.len(),
    }
}

fn scenario_a_inputs() -> PricingInputs {
    let request = JobPricingDraft::new("Senior Data Scientist", LONG_DESCRIPTION)
        .experience(5.0, 10.0)
        .industry("Technology")
        .location("Singapore")
        .validate()
        .unwrap();
    PricingInputs::from_request(&request, None).unwrap()
}

#[tokio::test]
async fn test_scenario_a_figures() {
    let cache = cache_for(seeded_params());
    let result = calculator().price(&scenario_a_inputs(), &cache).await.unwrap();

    assert_eq!(result.breakdown.experience_bucket, ExperienceBucket::Senior);
    assert!((result.breakdown.experience_multiplier - 1.225).abs() < 1e-12);
    assert_eq!(result.breakdown.base_salary, Money::from_major(120_000));
    assert_eq!(result.target_salary, Money::from_major(147_000));
    assert_eq!(result.recommended_min, Money::from_major(117_600));
    assert_eq!(result.recommended_max, Money::from_major(176_400));
    assert_eq!(result.percentiles.p50, Money::from_major(147_000));
    assert_eq!(result.percentiles.p10, Money::from_major(110_250));
    assert_eq!(result.percentiles.p90, Money::from_major(183_750));
    assert_eq!(result.currency, "USD");
    assert_eq!(result.parameter_version, "2026-q3");

    // 70 + 10 (description) + 0 (no skills) + 5 (experience) + 5 (location)
    assert_eq!(result.confidence_score, 90);
    assert_eq!(result.confidence_level, ConfidenceLevel::High);
}

#[tokio::test]
async fn test_experience_multiplier_capped() {
    let cache = cache_for(seeded_params().band("lead", 130_000.0, 170_000.0));
    for years in [15.0, 25.0, 60.0] {
        let result = calculator().price(&inputs(years), &cache).await.unwrap();
        assert!(result.breakdown.experience_multiplier <= 1.45);
        assert!((result.breakdown.experience_multiplier - 1.45).abs() < 1e-12);
    }
}

#[tokio::test]
async fn test_skill_premium_capped() {
    let cache = cache_for(seeded_params());
    let mut inputs = inputs(5.0);
    inputs.skills = vec!["Rust".into(), "Kubernetes".into(), "SQL".into()];

    let result = calculator().price(&inputs, &cache).await.unwrap();
    assert!((result.breakdown.skill_premium_uncapped - 0.65).abs() < 1e-9);
    assert!((result.breakdown.skill_premium - 0.50).abs() < 1e-12);
    assert_eq!(result.breakdown.matched_skills.len(), 3);
    assert!(result.rationale.contains("capped"));
}

#[tokio::test]
async fn test_unmatched_skills_lower_confidence() {
    let cache = cache_for(seeded_params());
    let mut inputs = inputs(5.0);
    inputs.skills = vec!["Rust".into(), "COBOL".into()];

    let result = calculator().price(&inputs, &cache).await.unwrap();
    assert_eq!(result.breakdown.unmatched_skills, vec!["COBOL".to_string()]);
    // 70 + 10 + 5 (half the skills) + 5 (experience)
    assert_eq!(result.confidence_score, 90);
}

#[tokio::test]
async fn test_missing_band_is_parameter_not_found() {
    let cache = cache_for(seeded_params());
    let err = calculator().price(&inputs(12.0), &cache).await.unwrap_err();
    assert_eq!(
        err,
        PricingError::ParameterNotFound {
            category: ParamCategory::SalaryBand,
            key: "lead".to_string()
        }
    );
}

#[tokio::test]
async fn test_unknown_location_fail_fast() {
    let cache = cache_for(seeded_params());
    let mut inputs = inputs(5.0);
    inputs.location = Some("Atlantis".into());

    let err = calculator().price(&inputs, &cache).await.unwrap_err();
    assert_eq!(
        err,
        PricingError::ParameterNotFound {
            category: ParamCategory::LocationIndex,
            key: "atlantis".to_string()
        }
    );
}

#[tokio::test]
async fn test_unknown_location_neutral_policy() {
    let cache = cache_for(seeded_params());
    let calculator = PricingCalculator::new(
        PricingConfig::default().with_unresolved_location(UnresolvedLocationPolicy::Neutral),
    )
    .unwrap();
    let mut with_atlantis = inputs(5.0);
    with_atlantis.location = Some("Atlantis".into());

    let result = calculator.price(&with_atlantis, &cache).await.unwrap();
    assert_eq!(result.breakdown.location.value, 1.0);
    assert!(result.breakdown.location.fallback);
    assert_eq!(result.breakdown.location.key.as_deref(), Some("atlantis"));
    assert!(result.rationale.contains("atlantis, fallback"));

    let baseline = calculator.price(&inputs(5.0), &cache).await.unwrap();
    assert_eq!(result.target_salary, baseline.target_salary);
}

#[tokio::test]
async fn test_location_factor_applied() {
    let cache = cache_for(seeded_params());
    let mut sf = inputs(5.0);
    sf.location = Some("san francisco".into());

    let base = calculator().price(&inputs(5.0), &cache).await.unwrap();
    let result = calculator().price(&sf, &cache).await.unwrap();
    assert_eq!(
        result.target_salary,
        base.target_salary.scale(1.25).unwrap()
    );
}

#[tokio::test]
async fn test_unknown_industry_uses_default_row_flagged() {
    let cache = cache_for(seeded_params());
    let mut inputs = inputs(5.0);
    inputs.industry = Some("Aerospace".into());
    inputs.company_size = Some("Enterprise".into());

    let result = calculator().price(&inputs, &cache).await.unwrap();
    assert_eq!(result.breakdown.industry.key.as_deref(), Some("default"));
    assert!(result.breakdown.industry.fallback);
    assert_eq!(result.breakdown.company_size.key.as_deref(), Some("enterprise"));
    assert!(!result.breakdown.company_size.fallback);
    assert!((result.breakdown.company_size.value - 1.05).abs() < 1e-12);
}

#[tokio::test]
async fn test_missing_default_row_is_parameter_not_found() {
    let set = ParameterSet::new("broken")
        .band("mid", 80_000.0, 110_000.0)
        .factor(ParamCategory::IndustryAdjustment, "default", 1.0);
    let cache = cache_for(set);

    let err = calculator().price(&inputs(5.0), &cache).await.unwrap_err();
    assert_eq!(
        err,
        PricingError::ParameterNotFound {
            category: ParamCategory::CompanySizeFactor,
            key: "default".to_string()
        }
    );
}

#[tokio::test]
async fn test_band_ordering_and_confidence_range_hold_across_inputs() {
    let cache = cache_for(seeded_params().band("lead", 130_000.0, 170_000.0));
    let calculator = calculator();
    let skill_sets: [&[&str]; 3] = [&[], &["rust"], &["rust", "kubernetes", "sql", "cobol"]];

    for years in [0.0, 1.5, 3.0, 6.0, 9.9, 10.0, 30.0] {
        for skills in skill_sets {
            for location in [None, Some("Singapore"), Some("San Francisco")] {
                let mut inputs = inputs(years);
                inputs.skills = skills.iter().map(|s| s.to_string()).collect();
                inputs.location = location.map(str::to_string);

                let r = calculator.price(&inputs, &cache).await.unwrap();
                assert!(r.recommended_min <= r.target_salary);
                assert!(r.target_salary <= r.recommended_max);
                assert!(r.confidence_score <= 100);
                assert!(r.breakdown.skill_premium <= 0.50);
                assert!(r.breakdown.experience_multiplier <= 1.45);
                let p = r.percentiles;
                assert!(p.p10 <= p.p25 && p.p25 <= p.p50 && p.p50 <= p.p75 && p.p75 <= p.p90);
            }
        }
    }
}

#[tokio::test]
async fn test_compute_is_deterministic() {
    let cache = cache_for(seeded_params());
    let calculator = calculator();
    let mut inputs = scenario_a_inputs();
    inputs.skills = vec!["sql".into(), "rust".into()];

    let factors = calculator.resolve_factors(&inputs, &cache).await.unwrap();
    let first = calculator.compute(&factors).unwrap();
    let second = calculator.compute(&factors).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
}

#[tokio::test]
async fn test_monthly_period() {
    let cache = cache_for(seeded_params());
    let config = PricingConfig {
        period: PayPeriod::Monthly,
        ..Default::default()
    };
    let result = PricingCalculator::new(config)
        .unwrap()
        .price(&scenario_a_inputs(), &cache)
        .await
        .unwrap();
    assert_eq!(result.period, PayPeriod::Monthly);
    assert_eq!(result.target_salary, Money::from_minor(1_225_000));
}

#[test]
fn test_compute_guards_invariants() {
    let factors = ResolvedFactors {
        bucket: ExperienceBucket::Mid,
        years: 5.0,
        band_min: -10_000.0,
        band_max: -5_000.0,
        location: AppliedFactor::baseline(),
        matched_skills: Vec::new(),
        unmatched_skills: Vec::new(),
        industry: AppliedFactor::baseline(),
        company_size: AppliedFactor::baseline(),
        experience_given: true,
        location_given: false,
        description_chars: 0,
        versions: BTreeSet::from(["v".to_string()]),
    };
    assert!(matches!(
        calculator().compute(&factors),
        Err(PricingError::CalculationInvariant { .. })
    ));
}

#[test]
fn test_confidence_level_thresholds() {
    assert_eq!(ConfidenceLevel::from_score(100), ConfidenceLevel::High);
    assert_eq!(ConfidenceLevel::from_score(85), ConfidenceLevel::High);
    assert_eq!(ConfidenceLevel::from_score(84), ConfidenceLevel::Medium);
    assert_eq!(ConfidenceLevel::from_score(70), ConfidenceLevel::Medium);
    assert_eq!(ConfidenceLevel::from_score(69), ConfidenceLevel::Low);

    let levels: Vec<_> = (0..=100u8).map(ConfidenceLevel::from_score).collect();
    assert!(levels.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_pricing_config_validation() {
    assert!(PricingConfig::default().validate().is_ok());

    let bad_band = PricingConfig {
        band: BandMultipliers {
            lower: 1.1,
            upper: 1.2,
        },
        ..Default::default()
    };
    assert!(bad_band.validate().is_err());

    let bad_percentiles = PricingConfig {
        percentiles: PercentileMultipliers {
            p25: 0.5,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(bad_percentiles.validate().is_err());

    let bad_currency = PricingConfig {
        currency: "usd".into(),
        ..Default::default()
    };
    assert!(matches!(
        bad_currency.validate(),
        Err(PricingError::InvalidConfig { .. })
    ));

    let bad_cap = PricingConfig {
        experience_multiplier_cap: 0.9,
        ..Default::default()
    };
    assert!(PricingCalculator::new(bad_cap).is_err());
}

#[test]
fn test_inputs_experience_resolution() {
    let one_bound = JobPricingDraft {
        years_min: Some(4.0),
        ..JobPricingDraft::new("Engineer", "Writes code")
    }
    .validate()
    .unwrap();
    let inputs = PricingInputs::from_request(&one_bound, Some("lead")).unwrap();
    assert_eq!(inputs.years, 4.0);
    assert!(inputs.experience_given);

    let no_bounds = JobPricingDraft::new("Engineer", "Writes code").validate().unwrap();
    let inputs = PricingInputs::from_request(&no_bounds, Some("Senior")).unwrap();
    assert_eq!(inputs.years, 8.5);
    assert!(!inputs.experience_given);

    assert_eq!(
        PricingInputs::from_request(&no_bounds, None),
        Err(ValidationError::ExperienceUnresolved)
    );
    assert_eq!(
        PricingInputs::from_request(&no_bounds, Some("wizard")),
        Err(ValidationError::ExperienceUnresolved)
    );
}

#[test]
fn test_policy_parsing() {
    assert_eq!(
        "neutral".parse::<UnresolvedLocationPolicy>(),
        Ok(UnresolvedLocationPolicy::Neutral)
    );
    assert_eq!(
        "FAIL_FAST".parse::<UnresolvedLocationPolicy>(),
        Ok(UnresolvedLocationPolicy::FailFast)
    );
    assert!("maybe".parse::<UnresolvedLocationPolicy>().is_err());
    assert_eq!("monthly".parse::<PayPeriod>(), Ok(PayPeriod::Monthly));
}
