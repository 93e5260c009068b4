use thiserror::Error;

use crate::params::{ParamCategory, ParameterCacheError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// A required pricing dimension is absent from the current parameter version.
    #[error("pricing parameter not found: {category}/{key}")]
    ParameterNotFound { category: ParamCategory, key: String },

    /// A parameter exists but holds the wrong kind of value.
    #[error("pricing parameter {category}/{key} has the wrong shape: {reason}")]
    ParameterMismatch {
        category: ParamCategory,
        key: String,
        reason: String,
    },

    /// The formula produced a result that violates its own guarantees.
    #[error("pricing invariant violated: {reason}")]
    CalculationInvariant { reason: String },

    #[error("parameter cache error: {0}")]
    Cache(#[from] ParameterCacheError),

    #[error("invalid pricing configuration: {reason}")]
    InvalidConfig { reason: String },
}
