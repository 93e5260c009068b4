//! Final result records and the sink they are handed to.

mod error;
mod sink;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::arbitration::MatchResult;
use crate::pricing::PricingResult;

pub use error::SinkError;
pub use sink::{MemoryResultSink, ResultSink};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Immutable outcome of one `resolve_and_price` call.
pub struct PricingOutcome {
    pub request_id: Uuid,
    pub match_result: MatchResult,
    /// `None` only when pricing was not attempted.
    pub pricing: Option<PricingResult>,
    pub rationale: String,
}

impl PricingOutcome {
    pub fn is_matched(&self) -> bool {
        self.match_result.is_matched()
    }

    pub fn is_priced(&self) -> bool {
        self.pricing.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Combines a match and an optional price into a [`PricingOutcome`].
pub struct ResultAssembler;

impl ResultAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, match_result: MatchResult, pricing: Option<PricingResult>) -> PricingOutcome {
        let rationale = render_rationale(&match_result, pricing.as_ref());
        PricingOutcome {
            request_id: match_result.request_id,
            match_result,
            pricing,
            rationale,
        }
    }
}

fn render_rationale(match_result: &MatchResult, pricing: Option<&PricingResult>) -> String {
    let match_part = match (&match_result.reference_code, &match_result.reference_title) {
        (Some(code), title) => format!(
            "Matched to {} ({code}) by {} with confidence {:.2} (similarity {:.2}): {}",
            title.as_deref().unwrap_or(code),
            match_result.method.as_str(),
            match_result.confidence,
            match_result.similarity,
            match_result.rationale
        ),
        (None, _) => format!("No reference job matched: {}", match_result.rationale),
    };

    match pricing {
        None => format!("{match_part}. Not priced."),
        Some(p) => {
            let basis = if match_result.is_matched() {
                ""
            } else {
                " from structural attributes only"
            };
            format!(
                "{match_part}. Priced{basis}: {} {} to {} {}, target {}, confidence {}/100 ({:?}); parameters {}. {}",
                p.currency,
                p.recommended_min,
                p.recommended_max,
                p.period.as_str(),
                p.target_salary,
                p.confidence_score,
                p.confidence_level,
                p.parameter_version,
                p.rationale
            )
        }
    }
}
