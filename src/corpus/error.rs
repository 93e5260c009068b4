use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by corpus index operations.
pub enum CorpusError {
    /// Could not connect to the index backend.
    #[error("failed to connect to corpus index at '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    /// Collection creation or lookup failed.
    #[error("failed to prepare collection '{collection}': {message}")]
    CollectionFailed { collection: String, message: String },

    #[error("failed to upsert reference jobs into '{collection}': {message}")]
    UpsertFailed { collection: String, message: String },

    #[error("failed to search '{collection}': {message}")]
    SearchFailed { collection: String, message: String },

    #[error("failed to delete reference jobs from '{collection}': {message}")]
    DeleteFailed { collection: String, message: String },

    /// Query or stored vector has the wrong length.
    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A reference job failed structural checks on insert.
    #[error("invalid reference job '{code}': {reason}")]
    InvalidReferenceJob { code: String, reason: String },
}
