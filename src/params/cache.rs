//! Read-through TTL cache in front of a [`ParameterStore`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::future::join_all;
use moka::sync::Cache;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_REFRESH_SECS, DEFAULT_CACHE_TTL_SECS};

use super::{ParamCategory, ParamEntry, ParamKey, ParameterCacheError, ParameterStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterCacheConfig {
    /// No entry is served once it is older than this.
    pub ttl: Duration,
    /// Interval of the background refresh; must be shorter than `ttl`.
    pub refresh_interval: Duration,
    pub max_capacity: u64,
}

impl Default for ParameterCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            refresh_interval: Duration::from_secs(DEFAULT_CACHE_REFRESH_SECS),
            max_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl ParameterCacheConfig {
    pub fn validate(&self) -> Result<(), ParameterCacheError> {
        if self.ttl.is_zero() {
            return Err(ParameterCacheError::InvalidConfig {
                reason: "ttl must be > 0".to_string(),
            });
        }
        if self.refresh_interval.is_zero() || self.refresh_interval >= self.ttl {
            return Err(ParameterCacheError::InvalidConfig {
                reason: format!(
                    "refresh_interval must be > 0 and shorter than ttl ({:?} >= {:?})",
                    self.refresh_interval, self.ttl
                ),
            });
        }
        if self.max_capacity == 0 {
            return Err(ParameterCacheError::InvalidConfig {
                reason: "max_capacity must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Store reads that returned "not found".
    pub not_found: u64,
    /// Entries re-read by the background refresh.
    pub refreshed: u64,
    pub entries: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub refreshed: usize,
    /// Keys that disappeared from the store and were dropped.
    pub removed: usize,
    pub failed: usize,
    /// Reads discarded because the cache was invalidated while they were in flight.
    pub skipped: usize,
}

pub struct ParameterCache {
    store: Arc<dyn ParameterStore>,
    entries: Cache<ParamKey, ParamEntry>,
    config: ParameterCacheConfig,
    /// Bumped by every invalidation. A store read only populates the cache if no
    /// invalidation happened while it was in flight.
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    not_found: AtomicU64,
    refreshed: AtomicU64,
}

impl ParameterCache {
    pub fn new(
        store: Arc<dyn ParameterStore>,
        config: ParameterCacheConfig,
    ) -> Result<Self, ParameterCacheError> {
        config.validate()?;
        Ok(Self {
            store,
            entries: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(config.ttl)
                .build(),
            config,
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            refreshed: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &ParameterCacheConfig {
        &self.config
    }

    /// Cached value, or a store read on miss. "Not found" is `Ok(None)` and is not cached.
    pub async fn get(
        &self,
        category: ParamCategory,
        key: &str,
    ) -> Result<Option<ParamEntry>, ParameterCacheError> {
        self.get_key(&ParamKey::new(category, key)).await
    }

    #[instrument(skip(self), fields(param = %key))]
    pub async fn get_key(&self, key: &ParamKey) -> Result<Option<ParamEntry>, ParameterCacheError> {
        if let Some(entry) = self.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(entry));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let generation = self.generation.load(Ordering::Acquire);
        match self.store.fetch(key).await? {
            Some(entry) => {
                debug!(version = %entry.version, "Parameter loaded from store");
                self.insert_if_current(key.clone(), entry.clone(), generation);
                Ok(Some(entry))
            }
            None => {
                self.not_found.fetch_add(1, Ordering::Relaxed);
                debug!("Parameter not found in store");
                Ok(None)
            }
        }
    }

    pub fn invalidate(&self, category: ParamCategory, key: &str) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.invalidate(&ParamKey::new(category, key));
    }

    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.invalidate_all();
        info!("Parameter cache invalidated");
    }

    /// Version currently published by the backing store.
    pub async fn store_version(&self) -> Result<String, ParameterCacheError> {
        Ok(self.store.version().await?)
    }

    /// Inserts a value read under `generation`, undoing the insert if an invalidation
    /// raced with it. Returns whether the value stayed cached.
    fn insert_if_current(&self, key: ParamKey, entry: ParamEntry, generation: u64) -> bool {
        if self.generation.load(Ordering::Acquire) != generation {
            debug!(param = %key, "Invalidated during store read; not caching");
            return false;
        }
        self.entries.insert(key.clone(), entry);
        if self.generation.load(Ordering::Acquire) != generation {
            self.entries.invalidate(&key);
            return false;
        }
        true
    }

    pub fn contains(&self, category: ParamCategory, key: &str) -> bool {
        self.entries.contains_key(&ParamKey::new(category, key))
    }

    pub fn stats(&self) -> ParameterCacheStats {
        ParameterCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            refreshed: self.refreshed.load(Ordering::Relaxed),
            entries: self.entries.entry_count(),
        }
    }

    /// Runs moka's pending maintenance so `entry_count` is exact.
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }

    /// Re-reads every currently cached key from the store.
    ///
    /// Keys that vanished from the store are dropped. Keys whose read fails keep their
    /// old value until the TTL expires it.
    pub async fn refresh_cached(&self) -> RefreshReport {
        let keys: Vec<ParamKey> = self.entries.iter().map(|(k, _)| (*k).clone()).collect();
        if keys.is_empty() {
            return RefreshReport::default();
        }

        let generation = self.generation.load(Ordering::Acquire);
        let reads = join_all(keys.iter().map(|key| self.store.fetch(key))).await;

        let mut report = RefreshReport::default();
        for (key, result) in keys.into_iter().zip(reads) {
            match result {
                Ok(Some(entry)) => {
                    if self.insert_if_current(key, entry, generation) {
                        report.refreshed += 1;
                    } else {
                        report.skipped += 1;
                    }
                }
                Ok(None) => {
                    self.entries.invalidate(&key);
                    report.removed += 1;
                }
                Err(e) => {
                    warn!(param = %key, error = %e, "Parameter refresh failed; entry left to expire");
                    report.failed += 1;
                }
            }
        }

        self.refreshed
            .fetch_add(report.refreshed as u64, Ordering::Relaxed);
        let version = match self.store.version().await {
            Ok(version) => version,
            Err(e) => {
                debug!(error = %e, "Store version unavailable after refresh");
                String::from("unknown")
            }
        };
        debug!(
            version = %version,
            refreshed = report.refreshed,
            skipped = report.skipped,
            removed = report.removed,
            failed = report.failed,
            "Parameter cache refresh complete"
        );
        report
    }

    /// Starts the periodic refresh. The task ends once the last `Arc` to the cache is
    /// dropped, or when the handle is aborted.
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.config.refresh_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                let Some(cache) = weak.upgrade() else {
                    debug!("Parameter cache dropped; refresh task exiting");
                    break;
                };
                cache.refresh_cached().await;
            }
        })
    }
}
