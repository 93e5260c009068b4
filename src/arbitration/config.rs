use std::time::Duration;

use crate::constants::{
    DEFAULT_ARBITRATION_THRESHOLD, DEFAULT_COLLABORATOR_TIMEOUT_SECS,
    DEFAULT_EMBEDDING_ONLY_MIN_SIMILARITY,
};

use super::ArbitrationError;

pub const DEFAULT_ARBITRATION_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrationConfig {
    /// When false the engine accepts the top candidate on similarity alone.
    pub enabled: bool,
    pub model: String,
    /// Minimum arbitration confidence for a match.
    pub threshold: f32,
    /// Bound on one arbitration call, retries included.
    pub timeout: Duration,
    /// Minimum similarity accepted in embedding-only mode.
    pub embedding_only_min_similarity: f32,
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: DEFAULT_ARBITRATION_MODEL.to_string(),
            threshold: DEFAULT_ARBITRATION_THRESHOLD,
            timeout: Duration::from_secs(DEFAULT_COLLABORATOR_TIMEOUT_SECS),
            embedding_only_min_similarity: DEFAULT_EMBEDDING_ONLY_MIN_SIMILARITY,
        }
    }
}

impl ArbitrationConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ArbitrationError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ArbitrationError::InvalidConfig {
                reason: format!(
                    "threshold must be between 0.0 and 1.0, got {}",
                    self.threshold
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.embedding_only_min_similarity) {
            return Err(ArbitrationError::InvalidConfig {
                reason: format!(
                    "embedding_only_min_similarity must be between 0.0 and 1.0, got {}",
                    self.embedding_only_min_similarity
                ),
            });
        }
        if self.timeout.is_zero() {
            return Err(ArbitrationError::InvalidConfig {
                reason: "timeout must be > 0".to_string(),
            });
        }
        if self.enabled && self.model.trim().is_empty() {
            return Err(ArbitrationError::InvalidConfig {
                reason: "model cannot be empty when arbitration is enabled".to_string(),
            });
        }
        Ok(())
    }
}
