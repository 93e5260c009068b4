use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CURRENCY, DEFAULT_EXPERIENCE_MULTIPLIER_CAP, DEFAULT_EXPERIENCE_STEP_PER_YEAR,
    DEFAULT_SKILL_PREMIUM_CAP,
};

use super::PricingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// What to do when a supplied location is missing from the location index.
pub enum UnresolvedLocationPolicy {
    /// Abort with `ParameterNotFound`.
    #[default]
    FailFast,
    /// Apply 1.0 and flag the factor as a fallback in the breakdown.
    Neutral,
}

impl UnresolvedLocationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnresolvedLocationPolicy::FailFast => "fail_fast",
            UnresolvedLocationPolicy::Neutral => "neutral",
        }
    }
}

impl std::str::FromStr for UnresolvedLocationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail_fast" | "fail-fast" | "failfast" => Ok(UnresolvedLocationPolicy::FailFast),
            "neutral" => Ok(UnresolvedLocationPolicy::Neutral),
            other => Err(format!("unknown unresolved-location policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayPeriod {
    #[default]
    Annual,
    Monthly,
}

impl PayPeriod {
    /// Salary tables are annual; other periods divide by this.
    pub fn divisor(&self) -> f64 {
        match self {
            PayPeriod::Annual => 1.0,
            PayPeriod::Monthly => 12.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayPeriod::Annual => "annual",
            PayPeriod::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for PayPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "annual" | "yearly" => Ok(PayPeriod::Annual),
            "monthly" => Ok(PayPeriod::Monthly),
            other => Err(format!("unknown pay period '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandMultipliers {
    pub lower: f64,
    pub upper: f64,
}

impl Default for BandMultipliers {
    fn default() -> Self {
        Self {
            lower: 0.80,
            upper: 1.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileMultipliers {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl Default for PercentileMultipliers {
    fn default() -> Self {
        Self {
            p10: 0.75,
            p25: 0.90,
            p50: 1.00,
            p75: 1.10,
            p90: 1.25,
        }
    }
}

impl PercentileMultipliers {
    pub fn as_array(&self) -> [f64; 5] {
        [self.p10, self.p25, self.p50, self.p75, self.p90]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub skill_premium_cap: f64,
    pub experience_multiplier_cap: f64,
    pub experience_step_per_year: f64,
    pub band: BandMultipliers,
    pub percentiles: PercentileMultipliers,
    pub unresolved_location: UnresolvedLocationPolicy,
    /// ISO 4217 code stamped on results.
    pub currency: String,
    pub period: PayPeriod,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            skill_premium_cap: DEFAULT_SKILL_PREMIUM_CAP,
            experience_multiplier_cap: DEFAULT_EXPERIENCE_MULTIPLIER_CAP,
            experience_step_per_year: DEFAULT_EXPERIENCE_STEP_PER_YEAR,
            band: BandMultipliers::default(),
            percentiles: PercentileMultipliers::default(),
            unresolved_location: UnresolvedLocationPolicy::default(),
            currency: DEFAULT_CURRENCY.to_string(),
            period: PayPeriod::default(),
        }
    }
}

impl PricingConfig {
    pub fn with_unresolved_location(mut self, policy: UnresolvedLocationPolicy) -> Self {
        self.unresolved_location = policy;
        self
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        let invalid = |reason: String| Err(PricingError::InvalidConfig { reason });

        if !self.skill_premium_cap.is_finite() || self.skill_premium_cap < 0.0 {
            return invalid(format!(
                "skill_premium_cap must be >= 0, got {}",
                self.skill_premium_cap
            ));
        }
        if !self.experience_multiplier_cap.is_finite() || self.experience_multiplier_cap < 1.0 {
            return invalid(format!(
                "experience_multiplier_cap must be >= 1.0, got {}",
                self.experience_multiplier_cap
            ));
        }
        if !self.experience_step_per_year.is_finite() || self.experience_step_per_year < 0.0 {
            return invalid(format!(
                "experience_step_per_year must be >= 0, got {}",
                self.experience_step_per_year
            ));
        }
        if !(self.band.lower > 0.0 && self.band.lower <= 1.0 && self.band.upper >= 1.0)
            || !self.band.upper.is_finite()
        {
            return invalid(format!(
                "band multipliers must satisfy 0 < lower <= 1 <= upper, got [{}, {}]",
                self.band.lower, self.band.upper
            ));
        }
        let p = self.percentiles.as_array();
        if p.iter().any(|v| !v.is_finite() || *v <= 0.0) || p.windows(2).any(|w| w[0] > w[1]) {
            return invalid(format!(
                "percentile multipliers must be positive and non-decreasing, got {p:?}"
            ));
        }
        let currency = self.currency.as_bytes();
        if currency.len() != 3 || !currency.iter().all(u8::is_ascii_uppercase) {
            return invalid(format!(
                "currency must be a three-letter ISO code, got '{}'",
                self.currency
            ));
        }
        Ok(())
    }
}
