//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use payband::arbitration::ScriptedArbiter;
use payband::{
    CandidateRetriever, EngineConfig, MemoryCorpus, MemoryParameterStore, MemoryResultSink,
    ParamCategory, ParameterCache, ParameterCacheConfig, ParameterSet, ReferenceJob,
    ResolutionEngine, RetrievalConfig, StubEmbedder,
};

pub const DIM: usize = 128;

pub const DATA_SCIENCE_DESCRIPTION: &str = "Builds statistical and machine learning models \
for demand forecasting, partners with product teams, and owns experimentation design end to end.";

/// Parameter version 2026-q3: the mid/senior midpoint is 120,000 and every other
/// factor is 1.0 for the Scenario A attributes.
pub fn seeded_params() -> ParameterSet {
    ParameterSet::new("2026-q3")
        .band("entry", 50_000.0, 70_000.0)
        .band("junior", 65_000.0, 85_000.0)
        .band("mid", 100_000.0, 140_000.0)
        .band("senior", 100_000.0, 140_000.0)
        .band("lead", 130_000.0, 190_000.0)
        .factor(ParamCategory::IndustryAdjustment, "default", 1.0)
        .factor(ParamCategory::IndustryAdjustment, "Technology", 1.0)
        .factor(ParamCategory::IndustryAdjustment, "Finance", 1.10)
        .factor(ParamCategory::CompanySizeFactor, "default", 1.0)
        .factor(ParamCategory::CompanySizeFactor, "enterprise", 1.05)
        .factor(ParamCategory::LocationIndex, "Singapore", 1.0)
        .factor(ParamCategory::LocationIndex, "London", 1.15)
        .factor(ParamCategory::SkillPremium, "python", 0.10)
        .factor(ParamCategory::SkillPremium, "rust", 0.30)
        .factor(ParamCategory::SkillPremium, "kubernetes", 0.30)
}

pub fn reference_jobs() -> Vec<ReferenceJob> {
    vec![
        ReferenceJob::new(
            "DS-301",
            "Senior Data Scientist",
            "Data",
            "senior",
            DATA_SCIENCE_DESCRIPTION,
        ),
        ReferenceJob::new(
            "SE-201",
            "Software Engineer",
            "Engineering",
            "mid",
            "Designs and operates backend services and APIs.",
        ),
        ReferenceJob::new(
            "PM-301",
            "Senior Product Manager",
            "Product",
            "senior",
            "Owns roadmap, discovery and delivery for a product area.",
        ),
        ReferenceJob::new(
            "WH-101",
            "Forklift Operator",
            "Logistics",
            "entry",
            "Moves pallets and stock around the warehouse floor.",
        ),
    ]
}

pub fn seeded_corpus(embedder: &StubEmbedder) -> MemoryCorpus {
    let corpus = MemoryCorpus::new(DIM);
    corpus
        .upsert(reference_jobs().into_iter().map(|job| {
            let embedding = embedder.embed_sync(&job.embedding_text());
            job.with_embedding(embedding)
        }))
        .expect("seed corpus");
    corpus
}

pub struct TestEngine {
    pub engine: ResolutionEngine<MemoryCorpus>,
    pub arbiter: Arc<ScriptedArbiter>,
    pub store: Arc<MemoryParameterStore>,
    pub cache: Arc<ParameterCache>,
    pub sink: Arc<MemoryResultSink>,
}

pub fn build_engine(config: EngineConfig, corpus: MemoryCorpus, arbiter: ScriptedArbiter) -> TestEngine {
    let embedder = Arc::new(StubEmbedder::new(DIM).expect("embedder"));
    let retriever = CandidateRetriever::new(embedder, Arc::new(corpus), RetrievalConfig::default())
        .expect("retriever");
    let store = Arc::new(MemoryParameterStore::new(seeded_params()).expect("store"));
    let cache = Arc::new(
        ParameterCache::new(store.clone(), ParameterCacheConfig::default()).expect("cache"),
    );
    let arbiter = Arc::new(arbiter);
    let sink = Arc::new(MemoryResultSink::new());
    let engine = ResolutionEngine::new(
        config,
        retriever,
        arbiter.clone(),
        cache.clone(),
        sink.clone(),
    )
    .expect("engine");

    TestEngine {
        engine,
        arbiter,
        store,
        cache,
        sink,
    }
}

/// Engine over the seeded corpus.
pub fn seeded_engine(config: EngineConfig, arbiter: ScriptedArbiter) -> TestEngine {
    let embedder = StubEmbedder::new(DIM).expect("embedder");
    build_engine(config, seeded_corpus(&embedder), arbiter)
}
