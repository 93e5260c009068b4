//! Payband library crate: job resolution and compensation pricing.
//!
//! A free-form job requisition is normalized, embedded, matched against a reference
//! job corpus (with an optional reasoning model arbitrating between candidates) and
//! priced from versioned compensation parameters served through a TTL cache.
//!
//! # Public API Surface
//!
//! ## Entry Point
//! - [`ResolutionEngine`] - `resolve_and_price` for one [`JobPricingRequest`]
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//!
//! ## Pipeline Stages
//! - [`normalize()`] - Deterministic query text
//! - [`CandidateRetriever`] over a [`CorpusIndex`] ([`MemoryCorpus`], [`QdrantCorpus`])
//! - [`ArbitrationSelector`] with a [`GenaiArbiter`] backend
//! - [`PricingCalculator`] reading a [`ParameterCache`]
//! - [`ResultAssembler`] and a [`ResultSink`]
//!
//! ## Utilities
//! - [`estimate_cost`] - Offline corpus embedding cost
//! - [`validate_embedding_dim`] - Dimension checks at the retrieval boundary
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod arbitration;
pub mod assembler;
pub mod config;
pub mod constants;
pub mod corpus;
pub mod cost;
pub mod embedding;
pub mod engine;
pub mod hashing;
pub mod normalize;
pub mod params;
pub mod pricing;
pub mod request;
pub mod retrieval;
pub mod retry;

pub use arbitration::{
    ArbitrationBackend, ArbitrationConfig, ArbitrationError, ArbitrationOutcome,
    ArbitrationSelector, GenaiArbiter, MatchMethod, MatchResult,
};
#[cfg(any(test, feature = "mock"))]
pub use arbitration::ScriptedArbiter;
pub use assembler::{MemoryResultSink, PricingOutcome, ResultAssembler, ResultSink, SinkError};
pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use corpus::{
    Candidate, CorpusError, CorpusIndex, MemoryCorpus, QdrantCorpus, ReferenceJob,
    RetrievalFilters,
};
pub use cost::{CostEstimate, CostModel, estimate_cost};
pub use embedding::{Embedder, EmbeddingError, HttpEmbedder, HttpEmbedderConfig, StubEmbedder};
pub use engine::{
    CancellationFlag, EngineConfig, EngineError, EngineMetricsSnapshot, ResolutionEngine,
    UnmatchedPricingMode,
};
pub use hashing::{fingerprint_bytes, hash_to_u64, reference_point_id};
pub use normalize::normalize;
pub use params::{
    MemoryParameterStore, ParamCategory, ParameterCache, ParameterCacheConfig,
    ParameterCacheError, ParameterSet, ParameterStore, StoreError,
};
pub use pricing::{
    ConfidenceLevel, ExperienceBucket, Money, PayPeriod, PricingCalculator, PricingConfig,
    PricingError, PricingInputs, PricingResult, UnresolvedLocationPolicy,
};
pub use request::{
    JobPricingDraft, JobPricingRequest, RequestRecord, RequestStatus, Urgency, ValidationError,
};
pub use retrieval::{CandidateRetriever, RetrievalConfig, RetrievalError};
pub use retry::RetryPolicy;
