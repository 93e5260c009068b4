use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::hashing::fingerprint_bytes;
use crate::request::{JobPricingRequest, ValidationError};

use super::config::PayPeriod;
use super::{ExperienceBucket, Money};

/// Descriptions longer than this earn the description confidence bonus.
pub const DESCRIPTION_BONUS_MIN_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
/// Request attributes the calculator needs, with experience already resolved.
pub struct PricingInputs {
    pub years: f64,
    /// True when the request itself carried an experience bound.
    pub experience_given: bool,
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub description_chars: usize,
}

impl PricingInputs {
    /// Resolves experience from the request bounds, or from the matched reference job's
    /// career level when the request has none.
    pub fn from_request(
        request: &JobPricingRequest,
        reference_level: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let years = match request.average_years() {
            Some(years) => years,
            None => reference_level
                .and_then(ExperienceBucket::from_label)
                .map(|bucket| bucket.representative_years())
                .ok_or(ValidationError::ExperienceUnresolved)?,
        };

        Ok(Self {
            years,
            experience_given: request.has_experience(),
            location: request.location().map(str::to_string),
            skills: request.skills().to_vec(),
            industry: request.industry().map(str::to_string),
            company_size: request.company_size().map(str::to_string),
            description_chars: request.description().chars().count(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A multiplicative factor and where it came from.
pub struct AppliedFactor {
    pub value: f64,
    /// Parameter key that supplied the value; `None` for the implicit baseline.
    pub key: Option<String>,
    /// True when the requested key was missing and a neutral or default row was used.
    pub fallback: bool,
}

impl AppliedFactor {
    pub fn baseline() -> Self {
        Self {
            value: 1.0,
            key: None,
            fallback: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillPremiumMatch {
    pub skill: String,
    pub premium: f64,
}

#[derive(Debug, Clone, PartialEq)]
/// Everything read from the parameter cache for one calculation.
pub struct ResolvedFactors {
    pub bucket: ExperienceBucket,
    pub years: f64,
    pub band_min: f64,
    pub band_max: f64,
    pub location: AppliedFactor,
    pub matched_skills: Vec<SkillPremiumMatch>,
    pub unmatched_skills: Vec<String>,
    pub industry: AppliedFactor,
    pub company_size: AppliedFactor,
    pub experience_given: bool,
    pub location_given: bool,
    pub description_chars: usize,
    pub versions: BTreeSet<String>,
}

impl ResolvedFactors {
    pub fn requested_skill_count(&self) -> usize {
        self.matched_skills.len() + self.unmatched_skills.len()
    }

    /// Matched / requested; 0 when no skills were requested.
    pub fn skill_match_rate(&self) -> f64 {
        match self.requested_skill_count() {
            0 => 0.0,
            n => self.matched_skills.len() as f64 / n as f64,
        }
    }

    /// Single version id, or the sorted versions joined by `+` if a publish landed
    /// mid-resolution.
    pub fn parameter_version(&self) -> String {
        self.versions
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("+")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub const HIGH_MIN: u8 = 85;
    pub const MEDIUM_MIN: u8 = 70;

    pub fn from_score(score: u8) -> Self {
        if score >= Self::HIGH_MIN {
            ConfidenceLevel::High
        } else if score >= Self::MEDIUM_MIN {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: Money,
    pub p25: Money,
    pub p50: Money,
    pub p75: Money,
    pub p90: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Audit record of every factor that went into the target.
pub struct FactorBreakdown {
    pub experience_bucket: ExperienceBucket,
    pub experience_years: f64,
    pub base_band_min: Money,
    pub base_band_max: Money,
    pub base_salary: Money,
    pub experience_multiplier: f64,
    pub location: AppliedFactor,
    /// Sum of matched premiums before the cap.
    pub skill_premium_uncapped: f64,
    pub skill_premium: f64,
    pub matched_skills: Vec<SkillPremiumMatch>,
    pub unmatched_skills: Vec<String>,
    pub industry: AppliedFactor,
    pub company_size: AppliedFactor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub currency: String,
    pub period: PayPeriod,
    pub recommended_min: Money,
    pub recommended_max: Money,
    pub target_salary: Money,
    pub percentiles: Percentiles,
    pub confidence_score: u8,
    pub confidence_level: ConfidenceLevel,
    pub breakdown: FactorBreakdown,
    pub parameter_version: String,
    pub rationale: String,
}

impl PricingResult {
    /// BLAKE3 hex digest of the canonical JSON form.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        Ok(fingerprint_bytes(&serde_json::to_vec(self)?))
    }
}
