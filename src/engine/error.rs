use thiserror::Error;

use crate::arbitration::{ArbitrationError, MatchResult};
use crate::assembler::SinkError;
use crate::pricing::PricingError;
use crate::request::{StatusTransitionError, ValidationError};
use crate::retrieval::RetrievalError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("arbitration failed: {0}")]
    Arbitration(#[from] ArbitrationError),

    #[error("pricing failed: {0}")]
    Pricing(#[from] PricingError),

    /// Unmatched request while unmatched pricing is disabled.
    #[error("no reference job matched: {}", .0.rationale)]
    NoMatch(Box<MatchResult>),

    #[error("result sink failed: {0}")]
    Sink(#[from] SinkError),

    #[error("request lifecycle error: {0}")]
    Lifecycle(#[from] StatusTransitionError),

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid engine configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl EngineError {
    /// Short stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation",
            EngineError::Retrieval(_) => "retrieval",
            EngineError::Arbitration(_) => "arbitration",
            EngineError::Pricing(_) => "pricing",
            EngineError::NoMatch(_) => "no_match",
            EngineError::Sink(_) => "sink",
            EngineError::Lifecycle(_) => "lifecycle",
            EngineError::Cancelled => "cancelled",
            EngineError::InvalidConfig { .. } => "config",
        }
    }
}
