//! Offline estimate of what embedding a reference corpus costs.

use serde::Serialize;

/// Average tokens in one reference job's embedding text (title, family, level, description).
pub const DEFAULT_TOKENS_PER_JOB: u64 = 150;

/// Hosted small embedding models are priced around this, per million input tokens.
pub const DEFAULT_USD_PER_MILLION_TOKENS: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub tokens_per_job: u64,
    pub usd_per_million_tokens: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            tokens_per_job: DEFAULT_TOKENS_PER_JOB,
            usd_per_million_tokens: DEFAULT_USD_PER_MILLION_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostEstimate {
    pub tokens: u64,
    pub usd: f64,
}

impl CostModel {
    pub fn validate(&self) -> Result<(), String> {
        if self.tokens_per_job == 0 {
            return Err("tokens_per_job must be > 0".to_string());
        }
        if !self.usd_per_million_tokens.is_finite() || self.usd_per_million_tokens < 0.0 {
            return Err(format!(
                "usd_per_million_tokens must be >= 0, got {}",
                self.usd_per_million_tokens
            ));
        }
        Ok(())
    }

    pub fn estimate(&self, corpus_size: usize) -> CostEstimate {
        let tokens = (corpus_size as u64).saturating_mul(self.tokens_per_job);
        CostEstimate {
            tokens,
            usd: tokens as f64 / 1_000_000.0 * self.usd_per_million_tokens,
        }
    }
}

/// [`CostModel::estimate`] with the default model.
pub fn estimate_cost(corpus_size: usize) -> CostEstimate {
    CostModel::default().estimate(corpus_size)
}
