use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Processing => "processing",
            RequestStatus::Completed => "completed",
            RequestStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Failed)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal status transition {from} -> {to} for request {request_id}")]
pub struct StatusTransitionError {
    pub request_id: Uuid,
    pub from: RequestStatus,
    pub to: RequestStatus,
}

/// Mutable status companion of an immutable request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub request_id: Uuid,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl RequestRecord {
    pub fn new(request_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            request_id,
            status: RequestStatus::Pending,
            created_at,
            processing_started_at: None,
            finished_at: None,
            error: None,
        }
    }

    pub fn start_processing(&mut self, at: DateTime<Utc>) -> Result<(), StatusTransitionError> {
        self.transition(RequestStatus::Pending, RequestStatus::Processing)?;
        self.processing_started_at = Some(at);
        Ok(())
    }

    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), StatusTransitionError> {
        self.transition(RequestStatus::Processing, RequestStatus::Completed)?;
        self.finished_at = Some(at);
        Ok(())
    }

    pub fn fail(
        &mut self,
        at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Result<(), StatusTransitionError> {
        self.transition(RequestStatus::Processing, RequestStatus::Failed)?;
        self.finished_at = Some(at);
        self.error = Some(error.into());
        Ok(())
    }

    fn transition(
        &mut self,
        expected: RequestStatus,
        to: RequestStatus,
    ) -> Result<(), StatusTransitionError> {
        if self.status != expected {
            return Err(StatusTransitionError {
                request_id: self.request_id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}
