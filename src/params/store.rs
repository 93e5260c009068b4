use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::info;

use super::{ParamEntry, ParamKey, ParameterSet, StoreError};

#[async_trait]
/// Authoritative source of pricing parameters. The engine only reads.
pub trait ParameterStore: Send + Sync {
    /// `Ok(None)` when the key does not exist in the current version.
    async fn fetch(&self, key: &ParamKey) -> Result<Option<ParamEntry>, StoreError>;

    /// Currently published version id.
    async fn version(&self) -> Result<String, StoreError>;
}

/// In-process store; [`publish`](Self::publish) swaps in a whole new version at once.
pub struct MemoryParameterStore {
    current: RwLock<ParameterSet>,
    reads: AtomicU64,
    unavailable: AtomicBool,
}

impl MemoryParameterStore {
    pub fn new(initial: ParameterSet) -> Result<Self, StoreError> {
        initial.validate()?;
        Ok(Self {
            current: RwLock::new(initial),
            reads: AtomicU64::new(0),
            unavailable: AtomicBool::new(false),
        })
    }

    pub fn publish(&self, set: ParameterSet) -> Result<(), StoreError> {
        set.validate()?;
        let version = set.version().to_string();
        let entries = set.len();
        *self.current.write() = set;
        info!(version = %version, entries, "Published parameter set");
        Ok(())
    }

    /// Number of `fetch` calls served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Simulates an outage: every read fails until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable {
                reason: "store marked unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn fetch(&self, key: &ParamKey) -> Result<Option<ParamEntry>, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;
        let current = self.current.read();
        Ok(current.get(key).map(|value| ParamEntry {
            value: *value,
            version: current.version().to_string(),
        }))
    }

    async fn version(&self) -> Result<String, StoreError> {
        self.check_available()?;
        Ok(self.current.read().version().to_string())
    }
}
