use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArbitrationError {
    #[error("reasoning backend '{backend}' failed: {message}")]
    Backend { backend: String, message: String },

    #[error("arbitration call timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("arbitration response malformed: {reason}")]
    MalformedResponse { reason: String },

    #[error("arbitration chose index {index} but only {candidates} candidates were offered")]
    IndexOutOfRange { index: usize, candidates: usize },

    #[error("arbitration confidence {value} outside [0, 1]")]
    ConfidenceOutOfRange { value: f64 },

    #[error("invalid arbitration configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ArbitrationError {
    /// Only backend transport failures are worth retrying; a bad answer stays bad.
    pub fn is_transient(&self) -> bool {
        matches!(self, ArbitrationError::Backend { .. })
    }
}
