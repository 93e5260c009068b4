//! Cross-cutting, shared constants.
//!
//! Every number here is a *default*. The calculator, selector and cache read their
//! limits from configuration structs, never from these constants directly.
//!
//! # Dimension Invariants
//!
//! Query embeddings and corpus embeddings must agree on dimension. Use
//! [`validate_embedding_dim`] at the retrieval boundary so a mismatched embedder is
//! reported as a typed error instead of producing meaningless similarities.

/// Arbitration decisions below this confidence are treated as "no match".
pub const DEFAULT_ARBITRATION_THRESHOLD: f32 = 0.70;

/// Minimum cosine similarity for accepting the top candidate when arbitration is off.
pub const DEFAULT_EMBEDDING_ONLY_MIN_SIMILARITY: f32 = 0.85;

/// Number of candidates retrieved per request.
pub const DEFAULT_TOP_K: usize = 5;

pub const DEFAULT_SKILL_PREMIUM_CAP: f64 = 0.50;
pub const DEFAULT_EXPERIENCE_MULTIPLIER_CAP: f64 = 1.45;
pub const DEFAULT_EXPERIENCE_STEP_PER_YEAR: f64 = 0.03;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_REFRESH_SECS: u64 = 240;
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Per-call timeout for embedding, vector search and arbitration collaborators.
pub const DEFAULT_COLLABORATOR_TIMEOUT_SECS: u64 = 30;

pub const DESCRIPTION_MAX_CHARS: usize = 2_000;
pub const SPECIALIZATION_MAX_CHARS: usize = 500;
pub const MAX_ALTERNATIVE_TITLES: usize = 5;

/// Parameter key that must exist for every factor category.
pub const DEFAULT_PARAMETER_KEY: &str = "default";

pub const DEFAULT_CURRENCY: &str = "USD";

pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Error returned when a runtime embedding dimension does not match the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use payband::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(384, DEFAULT_EMBEDDING_DIM).unwrap();
/// assert!(validate_embedding_dim(768, DEFAULT_EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
