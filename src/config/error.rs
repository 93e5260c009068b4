//! Configuration error types.

use thiserror::Error;

use crate::arbitration::ArbitrationError;
use crate::embedding::EmbeddingError;
use crate::params::ParameterCacheError;
use crate::pricing::PricingError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A parsed value is outside its allowed range.
    #[error("{name} is out of range: {reason}")]
    OutOfRange { name: &'static str, reason: String },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Arbitration(#[from] ArbitrationError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Cache(#[from] ParameterCacheError),
}
