use thiserror::Error;

use super::ParamCategory;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("parameter store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("parameter '{category}/{key}' is corrupt: {reason}")]
    Corrupt {
        category: ParamCategory,
        key: String,
        reason: String,
    },

    #[error("invalid parameter set: {reason}")]
    InvalidSet { reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterCacheError {
    #[error("parameter store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid parameter cache configuration: {reason}")]
    InvalidConfig { reason: String },
}
