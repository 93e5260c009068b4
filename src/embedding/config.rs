use std::time::Duration;

use crate::constants::{DEFAULT_COLLABORATOR_TIMEOUT_SECS, DEFAULT_EMBEDDING_DIM};
use crate::retry::RetryPolicy;

use super::EmbeddingError;

pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:8081/v1/embeddings";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm-l6-v2";

#[derive(Debug, Clone)]
/// Configuration for [`HttpEmbedder`](super::HttpEmbedder).
pub struct HttpEmbedderConfig {
    /// Full URL of the embeddings endpoint.
    pub url: String,
    pub model: String,
    /// Bearer token, if the endpoint requires one.
    pub api_key: Option<String>,
    /// Expected output dimension; responses of another length are rejected.
    pub dimension: usize,
    /// Per-HTTP-request timeout.
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for HttpEmbedderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_EMBEDDING_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key: None,
            dimension: DEFAULT_EMBEDDING_DIM,
            request_timeout: Duration::from_secs(DEFAULT_COLLABORATOR_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

impl HttpEmbedderConfig {
    pub const ENV_URL: &'static str = "PAYBAND_EMBEDDING_URL";
    pub const ENV_MODEL: &'static str = "PAYBAND_EMBEDDING_MODEL";
    pub const ENV_API_KEY: &'static str = "PAYBAND_EMBEDDING_API_KEY";
    pub const ENV_DIMENSION: &'static str = "PAYBAND_EMBEDDING_DIM";

    pub fn new(url: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            dimension,
            ..Default::default()
        }
    }

    /// Loads overrides from `PAYBAND_EMBEDDING_*` variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let url = env_string(Self::ENV_URL).unwrap_or(defaults.url);
        let model = env_string(Self::ENV_MODEL).unwrap_or(defaults.model);
        let api_key = env_string(Self::ENV_API_KEY);
        let dimension = env_string(Self::ENV_DIMENSION)
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.dimension);

        Self {
            url,
            model,
            api_key,
            dimension,
            ..defaults
        }
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.url.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "url must not be empty".to_string(),
            });
        }
        if self.dimension == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "dimension must be > 0".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "request_timeout must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
