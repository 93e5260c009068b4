use thiserror::Error;
use uuid::Uuid;

use crate::request::StatusTransitionError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SinkError {
    /// A different outcome is already stored for this request.
    #[error("an outcome is already recorded for request {request_id}")]
    AlreadyRecorded { request_id: Uuid },

    /// The status write would reopen or skip a lifecycle stage.
    #[error(transparent)]
    Transition(#[from] StatusTransitionError),

    #[error("result sink unavailable: {reason}")]
    Unavailable { reason: String },
}
