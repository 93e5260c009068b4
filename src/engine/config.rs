use serde::{Deserialize, Serialize};

use crate::arbitration::ArbitrationConfig;
use crate::pricing::PricingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Whether an unmatched request may still be priced.
pub enum UnmatchedPricingMode {
    /// Unmatched requests fail with `EngineError::NoMatch`.
    #[default]
    RequireMatch,
    /// Price from the request's own attributes; experience must come from the request.
    StructuralOnly,
}

impl UnmatchedPricingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnmatchedPricingMode::RequireMatch => "require_match",
            UnmatchedPricingMode::StructuralOnly => "structural_only",
        }
    }
}

impl std::str::FromStr for UnmatchedPricingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "require_match" | "require-match" => Ok(UnmatchedPricingMode::RequireMatch),
            "structural_only" | "structural-only" => Ok(UnmatchedPricingMode::StructuralOnly),
            other => Err(format!("unknown unmatched-pricing mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub arbitration: ArbitrationConfig,
    pub pricing: PricingConfig,
    pub unmatched: UnmatchedPricingMode,
    /// Narrow retrieval to the request's family/level hints when supplied.
    pub filter_by_hints: bool,
}
