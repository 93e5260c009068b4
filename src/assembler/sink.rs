use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::request::{RequestRecord, RequestStatus, StatusTransitionError};

use super::{PricingOutcome, SinkError};

#[async_trait]
/// Persistence boundary for finished outcomes and request status changes.
pub trait ResultSink: Send + Sync {
    /// Appends a status change. Implementations must reject a write that reopens a
    /// finished request or restarts one already in flight.
    async fn record_status(&self, record: &RequestRecord) -> Result<(), SinkError>;

    /// Most recent status record for the request, if any was written.
    async fn latest_record(&self, request_id: Uuid) -> Result<Option<RequestRecord>, SinkError>;

    async fn stored_outcome(&self, request_id: Uuid) -> Result<Option<PricingOutcome>, SinkError>;

    /// Stores the outcome. Implementations must reject a second, different outcome for
    /// the same request id.
    async fn record_outcome(&self, outcome: &PricingOutcome) -> Result<(), SinkError>;
}

#[derive(Default)]
/// In-memory sink. Replaying an identical outcome is accepted; a different one is not.
pub struct MemoryResultSink {
    outcomes: Mutex<HashMap<Uuid, PricingOutcome>>,
    statuses: Mutex<HashMap<Uuid, Vec<RequestRecord>>>,
    unavailable: AtomicBool,
}

impl MemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self, request_id: Uuid) -> Option<PricingOutcome> {
        self.outcomes.lock().get(&request_id).cloned()
    }

    pub fn outcome_count(&self) -> usize {
        self.outcomes.lock().len()
    }

    /// Every status record written for the request, oldest first.
    pub fn status_history(&self, request_id: Uuid) -> Vec<RequestRecord> {
        self.statuses
            .lock()
            .get(&request_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn latest_status(&self, request_id: Uuid) -> Option<RequestStatus> {
        self.statuses
            .lock()
            .get(&request_id)
            .and_then(|history| history.last())
            .map(|record| record.status)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    fn check_available(&self) -> Result<(), SinkError> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(SinkError::Unavailable {
                reason: "sink marked unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ResultSink for MemoryResultSink {
    async fn record_status(&self, record: &RequestRecord) -> Result<(), SinkError> {
        self.check_available()?;
        let mut statuses = self.statuses.lock();
        let history = statuses.entry(record.request_id).or_default();
        if let Some(last) = history.last() {
            let reopens = last.status.is_terminal()
                || record.status == RequestStatus::Pending
                || record.status == last.status;
            if reopens {
                return Err(StatusTransitionError {
                    request_id: record.request_id,
                    from: last.status,
                    to: record.status,
                }
                .into());
            }
        }
        history.push(record.clone());
        Ok(())
    }

    async fn latest_record(&self, request_id: Uuid) -> Result<Option<RequestRecord>, SinkError> {
        self.check_available()?;
        Ok(self
            .statuses
            .lock()
            .get(&request_id)
            .and_then(|history| history.last().cloned()))
    }

    async fn stored_outcome(&self, request_id: Uuid) -> Result<Option<PricingOutcome>, SinkError> {
        self.check_available()?;
        Ok(self.outcomes.lock().get(&request_id).cloned())
    }

    async fn record_outcome(&self, outcome: &PricingOutcome) -> Result<(), SinkError> {
        self.check_available()?;
        let mut outcomes = self.outcomes.lock();
        match outcomes.get(&outcome.request_id) {
            Some(existing) if existing == outcome => {
                debug!(request_id = %outcome.request_id, "Identical outcome replayed");
                Ok(())
            }
            Some(_) => Err(SinkError::AlreadyRecorded {
                request_id: outcome.request_id,
            }),
            None => {
                outcomes.insert(outcome.request_id, outcome.clone());
                Ok(())
            }
        }
    }
}
