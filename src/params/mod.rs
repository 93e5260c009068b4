//! Versioned pricing parameters and the read-through cache in front of them.

mod cache;
mod error;
mod store;
mod types;


pub use cache::{ParameterCache, ParameterCacheConfig, ParameterCacheStats, RefreshReport};
pub use error::{ParameterCacheError, StoreError};
pub use store::{MemoryParameterStore, ParameterStore};
pub use types::{ParamCategory, ParamEntry, ParamKey, ParamValue, ParameterSet, normalize_key};
