use std::collections::BTreeSet;

use tracing::{debug, instrument, warn};

use crate::constants::DEFAULT_PARAMETER_KEY;
use crate::params::{ParamCategory, ParamEntry, ParameterCache, normalize_key};

use super::config::{PricingConfig, UnresolvedLocationPolicy};
use super::types::DESCRIPTION_BONUS_MIN_CHARS;
use super::{
    AppliedFactor, ConfidenceLevel, ExperienceBucket, FactorBreakdown, Money, Percentiles,
    PricingError, PricingInputs, PricingResult, ResolvedFactors, SkillPremiumMatch,
};

const CONFIDENCE_BASE: f64 = 70.0;
const CONFIDENCE_DESCRIPTION_BONUS: f64 = 10.0;
const CONFIDENCE_SKILL_BONUS_MAX: f64 = 10.0;
const CONFIDENCE_EXPERIENCE_BONUS: f64 = 5.0;
const CONFIDENCE_LOCATION_BONUS: f64 = 5.0;

/// Multi-factor salary calculation.
///
/// [`resolve_factors`](Self::resolve_factors) reads every parameter it needs and fails
/// before any result exists if one is missing. [`compute`](Self::compute) is pure: the
/// same factors always give the same result. Neither step retries.
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    config: PricingConfig,
}

impl PricingCalculator {
    pub fn new(config: PricingConfig) -> Result<Self, PricingError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// [`resolve_factors`](Self::resolve_factors) then [`compute`](Self::compute).
    pub async fn price(
        &self,
        inputs: &PricingInputs,
        cache: &ParameterCache,
    ) -> Result<PricingResult, PricingError> {
        let factors = self.resolve_factors(inputs, cache).await?;
        self.compute(&factors)
    }

    #[instrument(skip(self, inputs, cache), fields(years = inputs.years))]
    pub async fn resolve_factors(
        &self,
        inputs: &PricingInputs,
        cache: &ParameterCache,
    ) -> Result<ResolvedFactors, PricingError> {
        let mut versions = BTreeSet::new();
        let bucket = ExperienceBucket::from_years(inputs.years);

        let band_entry = require(cache, ParamCategory::SalaryBand, bucket.as_str()).await?;
        let (band_min, band_max) =
            band_entry
                .value
                .as_band()
                .ok_or_else(|| PricingError::ParameterMismatch {
                    category: ParamCategory::SalaryBand,
                    key: bucket.as_str().to_string(),
                    reason: "expected a min/max band".to_string(),
                })?;
        versions.insert(band_entry.version);

        let location = match inputs.location.as_deref() {
            None => AppliedFactor::baseline(),
            Some(location) => {
                let key = normalize_key(location);
                match cache.get(ParamCategory::LocationIndex, &key).await? {
                    Some(entry) => {
                        let value = factor_value(&entry, ParamCategory::LocationIndex, &key)?;
                        versions.insert(entry.version);
                        AppliedFactor {
                            value,
                            key: Some(key),
                            fallback: false,
                        }
                    }
                    None => match self.config.unresolved_location {
                        UnresolvedLocationPolicy::FailFast => {
                            return Err(PricingError::ParameterNotFound {
                                category: ParamCategory::LocationIndex,
                                key,
                            });
                        }
                        UnresolvedLocationPolicy::Neutral => {
                            warn!(location = %key, "Location not in index; applying neutral factor");
                            AppliedFactor {
                                value: 1.0,
                                key: Some(key),
                                fallback: true,
                            }
                        }
                    },
                }
            }
        };

        let mut matched_skills = Vec::new();
        let mut unmatched_skills = Vec::new();
        for skill in &inputs.skills {
            let key = normalize_key(skill);
            match cache.get(ParamCategory::SkillPremium, &key).await? {
                Some(entry) => {
                    let premium = factor_value(&entry, ParamCategory::SkillPremium, &key)?;
                    versions.insert(entry.version);
                    matched_skills.push(SkillPremiumMatch {
                        skill: skill.clone(),
                        premium,
                    });
                }
                None => unmatched_skills.push(skill.clone()),
            }
        }

        let industry = resolve_with_default(
            cache,
            ParamCategory::IndustryAdjustment,
            inputs.industry.as_deref(),
            &mut versions,
        )
        .await?;
        let company_size = resolve_with_default(
            cache,
            ParamCategory::CompanySizeFactor,
            inputs.company_size.as_deref(),
            &mut versions,
        )
        .await?;

        debug!(
            bucket = %bucket,
            matched_skills = matched_skills.len(),
            unmatched_skills = unmatched_skills.len(),
            location_fallback = location.fallback,
            "Pricing factors resolved"
        );

        Ok(ResolvedFactors {
            bucket,
            years: inputs.years,
            band_min,
            band_max,
            location,
            matched_skills,
            unmatched_skills,
            industry,
            company_size,
            experience_given: inputs.experience_given,
            location_given: inputs.location.is_some(),
            description_chars: inputs.description_chars,
            versions,
        })
    }

    pub fn compute(&self, factors: &ResolvedFactors) -> Result<PricingResult, PricingError> {
        let cfg = &self.config;

        let base = (factors.band_min + factors.band_max) / 2.0;
        let experience_multiplier = (1.0 + factors.years * cfg.experience_step_per_year)
            .min(cfg.experience_multiplier_cap);
        let skill_premium_uncapped: f64 = factors.matched_skills.iter().map(|s| s.premium).sum();
        let skill_premium = skill_premium_uncapped.min(cfg.skill_premium_cap);

        let target_major = base
            * experience_multiplier
            * factors.location.value
            * (1.0 + skill_premium)
            * factors.industry.value
            * factors.company_size.value
            / cfg.period.divisor();

        let target = Money::from_major_f64(target_major)?;
        let recommended_min = target.scale(cfg.band.lower)?;
        let recommended_max = target.scale(cfg.band.upper)?;
        let percentiles = Percentiles {
            p10: target.scale(cfg.percentiles.p10)?,
            p25: target.scale(cfg.percentiles.p25)?,
            p50: target.scale(cfg.percentiles.p50)?,
            p75: target.scale(cfg.percentiles.p75)?,
            p90: target.scale(cfg.percentiles.p90)?,
        };

        let confidence_score = confidence_score(factors);
        let confidence_level = ConfidenceLevel::from_score(confidence_score);

        if recommended_min > target || target > recommended_max {
            return Err(PricingError::CalculationInvariant {
                reason: format!(
                    "band [{recommended_min}, {recommended_max}] does not contain target {target}"
                ),
            });
        }
        if target <= Money::ZERO {
            return Err(PricingError::CalculationInvariant {
                reason: format!("target salary {target} is not positive"),
            });
        }
        if confidence_score > 100 {
            return Err(PricingError::CalculationInvariant {
                reason: format!("confidence score {confidence_score} exceeds 100"),
            });
        }

        let breakdown = FactorBreakdown {
            experience_bucket: factors.bucket,
            experience_years: factors.years,
            base_band_min: Money::from_major_f64(factors.band_min)?,
            base_band_max: Money::from_major_f64(factors.band_max)?,
            base_salary: Money::from_major_f64(base)?,
            experience_multiplier,
            location: factors.location.clone(),
            skill_premium_uncapped,
            skill_premium,
            matched_skills: factors.matched_skills.clone(),
            unmatched_skills: factors.unmatched_skills.clone(),
            industry: factors.industry.clone(),
            company_size: factors.company_size.clone(),
        };

        let rationale = render_rationale(&breakdown, &cfg.currency);

        Ok(PricingResult {
            currency: cfg.currency.clone(),
            period: cfg.period,
            recommended_min,
            recommended_max,
            target_salary: target,
            percentiles,
            confidence_score,
            confidence_level,
            breakdown,
            parameter_version: factors.parameter_version(),
            rationale,
        })
    }
}

async fn require(
    cache: &ParameterCache,
    category: ParamCategory,
    key: &str,
) -> Result<ParamEntry, PricingError> {
    cache
        .get(category, key)
        .await?
        .ok_or_else(|| PricingError::ParameterNotFound {
            category,
            key: key.to_string(),
        })
}

fn factor_value(entry: &ParamEntry, category: ParamCategory, key: &str) -> Result<f64, PricingError> {
    entry
        .value
        .as_factor()
        .ok_or_else(|| PricingError::ParameterMismatch {
            category,
            key: key.to_string(),
            reason: "expected a factor".to_string(),
        })
}

/// Supplied key if present, else the `"default"` row (which must exist).
async fn resolve_with_default(
    cache: &ParameterCache,
    category: ParamCategory,
    supplied: Option<&str>,
    versions: &mut BTreeSet<String>,
) -> Result<AppliedFactor, PricingError> {
    if let Some(raw) = supplied {
        let key = normalize_key(raw);
        if let Some(entry) = cache.get(category, &key).await? {
            let value = factor_value(&entry, category, &key)?;
            versions.insert(entry.version);
            return Ok(AppliedFactor {
                value,
                key: Some(key),
                fallback: false,
            });
        }
        debug!(category = %category, key = %key, "Unknown key; using default row");
    }

    let entry = require(cache, category, DEFAULT_PARAMETER_KEY).await?;
    let value = factor_value(&entry, category, DEFAULT_PARAMETER_KEY)?;
    versions.insert(entry.version);
    Ok(AppliedFactor {
        value,
        key: Some(DEFAULT_PARAMETER_KEY.to_string()),
        fallback: supplied.is_some(),
    })
}

fn confidence_score(factors: &ResolvedFactors) -> u8 {
    let mut score = CONFIDENCE_BASE;
    if factors.description_chars > DESCRIPTION_BONUS_MIN_CHARS {
        score += CONFIDENCE_DESCRIPTION_BONUS;
    }
    score += CONFIDENCE_SKILL_BONUS_MAX * factors.skill_match_rate();
    if factors.experience_given {
        score += CONFIDENCE_EXPERIENCE_BONUS;
    }
    if factors.location_given {
        score += CONFIDENCE_LOCATION_BONUS;
    }
    // Saturating cast; the caller guards the upper bound.
    score.round() as u8
}

fn render_rationale(b: &FactorBreakdown, currency: &str) -> String {
    let describe = |f: &AppliedFactor| {
        let key = f.key.as_deref().unwrap_or("baseline");
        if f.fallback {
            format!("x{:.3} ({key}, fallback)", f.value)
        } else {
            format!("x{:.3} ({key})", f.value)
        }
    };

    format!(
        "Base {currency} {} is the midpoint of the {} band [{}, {}]; experience x{:.3} for {:.1} years; \
location {}; skill premium +{:.1}% ({} of {} skills matched{}); industry {}; company size {}.",
        b.base_salary,
        b.experience_bucket,
        b.base_band_min,
        b.base_band_max,
        b.experience_multiplier,
        b.experience_years,
        describe(&b.location),
        b.skill_premium * 100.0,
        b.matched_skills.len(),
        b.matched_skills.len() + b.unmatched_skills.len(),
        if b.skill_premium < b.skill_premium_uncapped {
            ", capped"
        } else {
            ""
        },
        describe(&b.industry),
        describe(&b.company_size),
    )
}
