use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding service unreachable at '{url}': {reason}")]
    Unavailable { url: String, reason: String },

    #[error("embedding service returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("embedding response malformed: {reason}")]
    MalformedResponse { reason: String },

    #[error("embedding has wrong dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid embedder configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl EmbeddingError {
    /// Network failures, rate limits and 5xx responses may succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            EmbeddingError::Unavailable { .. } => true,
            EmbeddingError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        if err.is_decode() {
            EmbeddingError::MalformedResponse {
                reason: err.to_string(),
            }
        } else {
            EmbeddingError::Unavailable {
                url,
                reason: err.to_string(),
            }
        }
    }
}
