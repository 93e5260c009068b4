use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::corpus::Candidate;

use super::prompt::{Decision, build_prompt, decode_decision};
use super::{ArbitrationBackend, ArbitrationConfig, ArbitrationError, ArbitrationOutcome};

/// Asks the reasoning backend to pick one candidate and applies the confidence
/// threshold. Never retries; the backend call is bounded by `config.timeout`.
pub struct ArbitrationSelector {
    backend: Arc<dyn ArbitrationBackend>,
    config: ArbitrationConfig,
}

impl std::fmt::Debug for ArbitrationSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArbitrationSelector")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ArbitrationSelector {
    pub fn new(
        backend: Arc<dyn ArbitrationBackend>,
        config: ArbitrationConfig,
    ) -> Result<Self, ArbitrationError> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    pub fn threshold(&self) -> f32 {
        self.config.threshold
    }

    pub fn config(&self) -> &ArbitrationConfig {
        &self.config
    }

    #[instrument(skip(self, query_text, candidates), fields(candidates = candidates.len()))]
    pub async fn arbitrate(&self, query_text: &str, candidates: &[Candidate]) -> ArbitrationOutcome {
        if candidates.is_empty() {
            debug!("No candidates to arbitrate");
            return ArbitrationOutcome::NoMatch {
                reason: "no candidates retrieved".to_string(),
            };
        }

        let prompt = build_prompt(query_text, candidates);
        let raw = match tokio::time::timeout(self.config.timeout, self.backend.complete(&prompt))
            .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(error)) => {
                warn!(error = %error, "Arbitration backend failed");
                return ArbitrationOutcome::CallFailed { error };
            }
            Err(_) => {
                warn!(timeout = ?self.config.timeout, "Arbitration call timed out");
                return ArbitrationOutcome::CallFailed {
                    error: ArbitrationError::Timeout {
                        elapsed: self.config.timeout,
                    },
                };
            }
        };

        match decode_decision(&raw, candidates.len()) {
            Ok(Decision::Match {
                index,
                confidence,
                rationale,
            }) if confidence >= self.config.threshold => {
                info!(
                    index,
                    confidence,
                    code = %candidates[index].job.code,
                    "Arbitration matched candidate"
                );
                ArbitrationOutcome::Matched {
                    index,
                    confidence,
                    rationale,
                }
            }
            Ok(Decision::Match {
                index, confidence, ..
            }) => {
                debug!(
                    index,
                    confidence,
                    threshold = self.config.threshold,
                    "Arbitration confidence below threshold"
                );
                ArbitrationOutcome::NoMatch {
                    reason: format!(
                        "confidence {confidence:.2} below threshold {:.2}",
                        self.config.threshold
                    ),
                }
            }
            Ok(Decision::NoMatch { reason }) => {
                debug!(reason = %reason, "Arbitration rejected all candidates");
                ArbitrationOutcome::NoMatch { reason }
            }
            Err(error) => {
                warn!(error = %error, "Arbitration response rejected");
                ArbitrationOutcome::CallFailed { error }
            }
        }
    }
}

/// Accepts the top candidate on similarity alone, without a reasoning call.
///
/// The confidence reported for a match is the similarity itself.
pub fn embedding_only_outcome(candidates: &[Candidate], min_similarity: f32) -> ArbitrationOutcome {
    match candidates.first() {
        None => ArbitrationOutcome::NoMatch {
            reason: "no candidates retrieved".to_string(),
        },
        Some(top) if top.similarity >= min_similarity => ArbitrationOutcome::Matched {
            index: 0,
            confidence: top.similarity.clamp(0.0, 1.0),
            rationale: format!(
                "similarity {:.2} meets embedding-only minimum {:.2}",
                top.similarity, min_similarity
            ),
        },
        Some(top) => ArbitrationOutcome::NoMatch {
            reason: format!(
                "top similarity {:.2} below embedding-only minimum {:.2}",
                top.similarity, min_similarity
            ),
        },
    }
}
