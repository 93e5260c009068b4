use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::EngineError;

#[derive(Debug, Default)]
/// Counters owned by one engine instance.
pub struct EngineMetrics {
    requests: AtomicU64,
    completed: AtomicU64,
    replayed: AtomicU64,
    matched: AtomicU64,
    unmatched: AtomicU64,
    priced_unmatched: AtomicU64,
    validation_failures: AtomicU64,
    retrieval_failures: AtomicU64,
    arbitration_failures: AtomicU64,
    pricing_failures: AtomicU64,
    no_match_failures: AtomicU64,
    sink_failures: AtomicU64,
    lifecycle_failures: AtomicU64,
    cancelled: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineMetricsSnapshot {
    pub requests: u64,
    pub completed: u64,
    /// Resubmitted ids answered with their recorded outcome.
    pub replayed: u64,
    pub matched: u64,
    pub unmatched: u64,
    pub priced_unmatched: u64,
    pub validation_failures: u64,
    pub retrieval_failures: u64,
    pub arbitration_failures: u64,
    pub pricing_failures: u64,
    pub no_match_failures: u64,
    pub sink_failures: u64,
    /// Resubmitted ids whose earlier run failed or is still in flight.
    pub lifecycle_failures: u64,
    pub cancelled: u64,
}

impl EngineMetricsSnapshot {
    pub fn failed(&self) -> u64 {
        self.validation_failures
            + self.retrieval_failures
            + self.arbitration_failures
            + self.pricing_failures
            + self.no_match_failures
            + self.sink_failures
            + self.lifecycle_failures
            + self.cancelled
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_replay(&self) {
        self.replayed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_match(&self, matched: bool) {
        let counter = if matched { &self.matched } else { &self.unmatched };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self, matched: bool) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if !matched {
            self.priced_unmatched.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_failure(&self, error: &EngineError) {
        let counter = match error {
            EngineError::Validation(_) => &self.validation_failures,
            EngineError::Retrieval(_) => &self.retrieval_failures,
            EngineError::Arbitration(_) => &self.arbitration_failures,
            EngineError::Pricing(_) => &self.pricing_failures,
            EngineError::NoMatch(_) => &self.no_match_failures,
            EngineError::Sink(_) => &self.sink_failures,
            EngineError::Lifecycle(_) => &self.lifecycle_failures,
            EngineError::Cancelled => &self.cancelled,
            EngineError::InvalidConfig { .. } => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            replayed: self.replayed.load(Ordering::Relaxed),
            matched: self.matched.load(Ordering::Relaxed),
            unmatched: self.unmatched.load(Ordering::Relaxed),
            priced_unmatched: self.priced_unmatched.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            retrieval_failures: self.retrieval_failures.load(Ordering::Relaxed),
            arbitration_failures: self.arbitration_failures.load(Ordering::Relaxed),
            pricing_failures: self.pricing_failures.load(Ordering::Relaxed),
            no_match_failures: self.no_match_failures.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            lifecycle_failures: self.lifecycle_failures.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}
