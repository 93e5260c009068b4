use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::corpus::Candidate;

use super::ArbitrationError;

#[derive(Debug, Clone, PartialEq)]
/// What the selector decided for one request.
pub enum ArbitrationOutcome {
    /// `index` refers into the candidate list that was offered.
    Matched {
        index: usize,
        confidence: f32,
        rationale: String,
    },
    NoMatch {
        reason: String,
    },
    /// The capability failed or answered outside the contract.
    CallFailed {
        error: ArbitrationError,
    },
}

impl ArbitrationOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, ArbitrationOutcome::Matched { .. })
    }

    pub fn debug_status(&self) -> &'static str {
        match self {
            ArbitrationOutcome::Matched { .. } => "MATCHED",
            ArbitrationOutcome::NoMatch { .. } => "NO_MATCH",
            ArbitrationOutcome::CallFailed { .. } => "CALL_FAILED",
        }
    }
}

impl std::fmt::Display for ArbitrationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArbitrationOutcome::Matched {
                index, confidence, ..
            } => write!(f, "MATCHED (index: {index}, confidence: {confidence:.2})"),
            ArbitrationOutcome::NoMatch { reason } => write!(f, "NO_MATCH ({reason})"),
            ArbitrationOutcome::CallFailed { error } => write!(f, "CALL_FAILED ({error})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    EmbeddingOnly,
    LlmArbitrated,
    None,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::EmbeddingOnly => "embedding_only",
            MatchMethod::LlmArbitrated => "llm_arbitrated",
            MatchMethod::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Resolution of a request to a reference job, or the record that none was found.
pub struct MatchResult {
    pub request_id: Uuid,
    /// `None` when the request is unmatched.
    pub reference_code: Option<String>,
    pub reference_title: Option<String>,
    /// Similarity of the matched candidate, or of the best candidate when unmatched.
    pub similarity: f32,
    /// Arbitration confidence in `[0, 1]`.
    pub confidence: f32,
    pub rationale: String,
    pub method: MatchMethod,
}

impl MatchResult {
    pub fn matched(
        request_id: Uuid,
        candidate: &Candidate,
        confidence: f32,
        rationale: impl Into<String>,
        method: MatchMethod,
    ) -> Self {
        Self {
            request_id,
            reference_code: Some(candidate.job.code.clone()),
            reference_title: Some(candidate.job.title.clone()),
            similarity: candidate.similarity,
            confidence: confidence.clamp(0.0, 1.0),
            rationale: rationale.into(),
            method,
        }
    }

    pub fn unmatched(
        request_id: Uuid,
        best_similarity: f32,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            request_id,
            reference_code: None,
            reference_title: None,
            similarity: best_similarity,
            confidence: 0.0,
            rationale: rationale.into(),
            method: MatchMethod::None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.reference_code.is_some()
    }
}
