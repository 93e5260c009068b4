//! Deterministic multi-factor salary pricing.

mod bucket;
mod calculator;
pub mod config;
mod error;
mod money;
mod types;

#[cfg(test)]
mod tests;

pub use bucket::ExperienceBucket;
pub use calculator::PricingCalculator;
pub use config::{
    BandMultipliers, PayPeriod, PercentileMultipliers, PricingConfig, UnresolvedLocationPolicy,
};
pub use error::PricingError;
pub use money::Money;
pub use types::{
    AppliedFactor, ConfidenceLevel, FactorBreakdown, Percentiles, PricingInputs, PricingResult,
    ResolvedFactors, SkillPremiumMatch,
};
