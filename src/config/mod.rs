//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `PAYBAND_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::arbitration::ArbitrationConfig;
use crate::corpus::DEFAULT_COLLECTION_NAME;
use crate::cost::CostModel;
use crate::embedding::HttpEmbedderConfig;
use crate::engine::{EngineConfig, UnmatchedPricingMode};
use crate::params::ParameterCacheConfig;
use crate::pricing::{PayPeriod, PricingConfig, UnresolvedLocationPolicy};
use crate::retrieval::RetrievalConfig;

/// Default Qdrant URL used when `PAYBAND_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Engine configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `PAYBAND_*` overrides on top of defaults, then
/// [`Config::validate`] once before building components.
#[derive(Debug, Clone)]
pub struct Config {
    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Reference-job collection. Default: `payband_reference_jobs`.
    pub collection: String,

    pub embedding: HttpEmbedderConfig,
    pub retrieval: RetrievalConfig,
    pub arbitration: ArbitrationConfig,
    pub pricing: PricingConfig,
    pub cache: ParameterCacheConfig,

    /// Default: `require_match`.
    pub unmatched: UnmatchedPricingMode,

    /// Narrow retrieval by family/level hints. Default: `false`.
    pub filter_by_hints: bool,

    pub cost: CostModel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            embedding: HttpEmbedderConfig::default(),
            retrieval: RetrievalConfig::default(),
            arbitration: ArbitrationConfig::default(),
            pricing: PricingConfig::default(),
            cache: ParameterCacheConfig::default(),
            unmatched: UnmatchedPricingMode::default(),
            filter_by_hints: false,
            cost: CostModel::default(),
        }
    }
}

impl Config {
    const ENV_QDRANT_URL: &'static str = "PAYBAND_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "PAYBAND_COLLECTION";
    const ENV_EMBEDDING_DIM: &'static str = "PAYBAND_EMBEDDING_DIM";
    const ENV_TOP_K: &'static str = "PAYBAND_TOP_K";
    const ENV_RETRIEVAL_TIMEOUT_SECS: &'static str = "PAYBAND_RETRIEVAL_TIMEOUT_SECS";
    const ENV_ARBITRATION_ENABLED: &'static str = "PAYBAND_ARBITRATION_ENABLED";
    const ENV_ARBITRATION_MODEL: &'static str = "PAYBAND_ARBITRATION_MODEL";
    const ENV_ARBITRATION_THRESHOLD: &'static str = "PAYBAND_ARBITRATION_THRESHOLD";
    const ENV_ARBITRATION_TIMEOUT_SECS: &'static str = "PAYBAND_ARBITRATION_TIMEOUT_SECS";
    const ENV_EMBEDDING_ONLY_MIN_SIMILARITY: &'static str = "PAYBAND_EMBEDDING_ONLY_MIN_SIMILARITY";
    const ENV_SKILL_PREMIUM_CAP: &'static str = "PAYBAND_SKILL_PREMIUM_CAP";
    const ENV_EXPERIENCE_CAP: &'static str = "PAYBAND_EXPERIENCE_CAP";
    const ENV_UNRESOLVED_LOCATION: &'static str = "PAYBAND_UNRESOLVED_LOCATION";
    const ENV_CURRENCY: &'static str = "PAYBAND_CURRENCY";
    const ENV_PERIOD: &'static str = "PAYBAND_PERIOD";
    const ENV_CACHE_TTL_SECS: &'static str = "PAYBAND_CACHE_TTL_SECS";
    const ENV_CACHE_REFRESH_SECS: &'static str = "PAYBAND_CACHE_REFRESH_SECS";
    const ENV_CACHE_CAPACITY: &'static str = "PAYBAND_CACHE_CAPACITY";
    const ENV_UNMATCHED_PRICING: &'static str = "PAYBAND_UNMATCHED_PRICING";
    const ENV_FILTER_BY_HINTS: &'static str = "PAYBAND_FILTER_BY_HINTS";
    const ENV_COST_TOKENS_PER_JOB: &'static str = "PAYBAND_COST_TOKENS_PER_JOB";
    const ENV_COST_USD_PER_MTOK: &'static str = "PAYBAND_COST_USD_PER_MTOK";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// A variable that is set but unparsable is an error, never silently ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut embedding = HttpEmbedderConfig::from_env();
        embedding.dimension =
            parse_env(Self::ENV_EMBEDDING_DIM)?.unwrap_or(defaults.embedding.dimension);

        let retrieval_timeout = parse_secs(Self::ENV_RETRIEVAL_TIMEOUT_SECS)?
            .unwrap_or(defaults.retrieval.search_timeout);
        let retrieval = RetrievalConfig {
            top_k: parse_env(Self::ENV_TOP_K)?.unwrap_or(defaults.retrieval.top_k),
            embed_timeout: retrieval_timeout,
            search_timeout: retrieval_timeout,
        };

        let arbitration = ArbitrationConfig {
            enabled: parse_bool(Self::ENV_ARBITRATION_ENABLED)?
                .unwrap_or(defaults.arbitration.enabled),
            model: parse_string(Self::ENV_ARBITRATION_MODEL)
                .unwrap_or(defaults.arbitration.model),
            threshold: parse_env(Self::ENV_ARBITRATION_THRESHOLD)?
                .unwrap_or(defaults.arbitration.threshold),
            timeout: parse_secs(Self::ENV_ARBITRATION_TIMEOUT_SECS)?
                .unwrap_or(defaults.arbitration.timeout),
            embedding_only_min_similarity: parse_env(Self::ENV_EMBEDDING_ONLY_MIN_SIMILARITY)?
                .unwrap_or(defaults.arbitration.embedding_only_min_similarity),
        };

        let pricing = PricingConfig {
            skill_premium_cap: parse_env(Self::ENV_SKILL_PREMIUM_CAP)?
                .unwrap_or(defaults.pricing.skill_premium_cap),
            experience_multiplier_cap: parse_env(Self::ENV_EXPERIENCE_CAP)?
                .unwrap_or(defaults.pricing.experience_multiplier_cap),
            unresolved_location: parse_env::<UnresolvedLocationPolicy>(
                Self::ENV_UNRESOLVED_LOCATION,
            )?
            .unwrap_or(defaults.pricing.unresolved_location),
            currency: parse_string(Self::ENV_CURRENCY)
                .map(|c| c.to_uppercase())
                .unwrap_or(defaults.pricing.currency),
            period: parse_env::<PayPeriod>(Self::ENV_PERIOD)?.unwrap_or(defaults.pricing.period),
            ..defaults.pricing
        };

        let cache = ParameterCacheConfig {
            ttl: parse_secs(Self::ENV_CACHE_TTL_SECS)?.unwrap_or(defaults.cache.ttl),
            refresh_interval: parse_secs(Self::ENV_CACHE_REFRESH_SECS)?
                .unwrap_or(defaults.cache.refresh_interval),
            max_capacity: parse_env(Self::ENV_CACHE_CAPACITY)?
                .unwrap_or(defaults.cache.max_capacity),
        };

        let cost = CostModel {
            tokens_per_job: parse_env(Self::ENV_COST_TOKENS_PER_JOB)?
                .unwrap_or(defaults.cost.tokens_per_job),
            usd_per_million_tokens: parse_env(Self::ENV_COST_USD_PER_MTOK)?
                .unwrap_or(defaults.cost.usd_per_million_tokens),
        };

        Ok(Self {
            qdrant_url: parse_string(Self::ENV_QDRANT_URL).unwrap_or(defaults.qdrant_url),
            collection: parse_string(Self::ENV_COLLECTION).unwrap_or(defaults.collection),
            embedding,
            retrieval,
            arbitration,
            pricing,
            cache,
            unmatched: parse_env::<UnmatchedPricingMode>(Self::ENV_UNMATCHED_PRICING)?
                .unwrap_or(defaults.unmatched),
            filter_by_hints: parse_bool(Self::ENV_FILTER_BY_HINTS)?
                .unwrap_or(defaults.filter_by_hints),
            cost,
        })
    }

    /// Checks every section; the first violation wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_QDRANT_URL,
                reason: "must not be empty".to_string(),
            });
        }
        if self.collection.trim().is_empty() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_COLLECTION,
                reason: "must not be empty".to_string(),
            });
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_TOP_K,
                reason: "must be > 0".to_string(),
            });
        }
        if self.retrieval.embed_timeout.is_zero() || self.retrieval.search_timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_RETRIEVAL_TIMEOUT_SECS,
                reason: "must be > 0".to_string(),
            });
        }
        self.cost
            .validate()
            .map_err(|reason| ConfigError::OutOfRange {
                name: "cost model",
                reason,
            })?;

        self.embedding.validate()?;
        self.arbitration.validate()?;
        self.pricing.validate()?;
        self.cache.validate()?;
        Ok(())
    }

    /// Settings the resolution engine itself consumes.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            arbitration: self.arbitration.clone(),
            pricing: self.pricing.clone(),
            unmatched: self.unmatched,
            filter_by_hints: self.filter_by_hints,
        }
    }
}

fn raw_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_string(name: &str) -> Option<String> {
    raw_env(name)
}

fn parse_env<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(value) = raw_env(name) else {
        return Ok(None);
    };
    match value.parse::<T>() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => Err(ConfigError::InvalidValue {
            name,
            value,
            reason: e.to_string(),
        }),
    }
}

fn parse_secs(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    Ok(parse_env::<u64>(name)?.map(Duration::from_secs))
}

fn parse_bool(name: &'static str) -> Result<Option<bool>, ConfigError> {
    raw_env(name)
        .map(|value| match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name,
                reason: "expected true/false".to_string(),
                value,
            }),
        })
        .transpose()
}
