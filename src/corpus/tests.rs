use super::*;

fn job(code: &str, family: &str, level: &str, embedding: Vec<f32>) -> ReferenceJob {
    ReferenceJob::new(code, format!("{code} title"), family, level, "desc").with_embedding(embedding)
}

fn seeded() -> MemoryCorpus {
    let corpus = MemoryCorpus::new(3);
    corpus
        .upsert([
            job("A", "Engineering", "Senior", vec![1.0, 0.0, 0.0]),
            job("B", "Engineering", "Mid", vec![0.0, 1.0, 0.0]),
            job("C", "Data", "Senior", vec![1.0, 0.0, 0.0]),
            job("D", "Data", "Lead", vec![0.7, 0.7, 0.0]),
        ])
        .unwrap();
    corpus
}

#[test]
fn test_cosine_similarity_basics() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
}

#[tokio::test]
async fn test_search_orders_by_similarity_with_stable_ties() {
    let corpus = seeded();
    let results = corpus
        .search(&[1.0, 0.0, 0.0], 4, &RetrievalFilters::none())
        .await
        .unwrap();

    let codes: Vec<_> = results.iter().map(|c| c.job.code.as_str()).collect();
    assert_eq!(codes, vec!["A", "C", "D", "B"]);
    assert!(results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
}

#[tokio::test]
async fn test_search_truncates_to_top_k() {
    let corpus = seeded();
    let results = corpus
        .search(&[1.0, 0.0, 0.0], 2, &RetrievalFilters::none())
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_filters_are_case_insensitive() {
    let corpus = seeded();
    let results = corpus
        .search(&[1.0, 0.0, 0.0], 5, &RetrievalFilters::none().family("data"))
        .await
        .unwrap();
    let codes: Vec<_> = results.iter().map(|c| c.job.code.as_str()).collect();
    assert_eq!(codes, vec!["C", "D"]);

    let results = corpus
        .search(
            &[1.0, 0.0, 0.0],
            5,
            &RetrievalFilters::none().family("DATA").career_level("lead"),
        )
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].job.code, "D");
}

#[tokio::test]
async fn test_filters_excluding_everything_return_empty() {
    let corpus = seeded();
    let results = corpus
        .search(&[1.0, 0.0, 0.0], 5, &RetrievalFilters::none().family("Legal"))
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_empty_corpus_returns_empty() {
    let corpus = MemoryCorpus::new(3);
    let results = corpus
        .search(&[1.0, 0.0, 0.0], 5, &RetrievalFilters::none())
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_query_dimension_mismatch() {
    let corpus = seeded();
    let err = corpus
        .search(&[1.0, 0.0], 5, &RetrievalFilters::none())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CorpusError::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    ));
}

#[tokio::test]
async fn test_upsert_replaces_in_place() {
    let corpus = seeded();
    corpus
        .upsert([job("A", "Engineering", "Staff", vec![1.0, 0.0, 0.0])])
        .unwrap();
    assert_eq!(corpus.len(), 4);
    assert_eq!(corpus.get("A").unwrap().career_level, "Staff");

    // A still precedes C on the tie.
    let results = corpus
        .search(&[1.0, 0.0, 0.0], 2, &RetrievalFilters::none())
        .await
        .unwrap();
    assert_eq!(results[0].job.code, "A");
    assert_eq!(results[1].job.code, "C");
}

#[test]
fn test_upsert_rejects_bad_dimension_and_empty_code() {
    let corpus = MemoryCorpus::new(3);
    assert!(matches!(
        corpus.upsert([job("X", "F", "Mid", vec![1.0])]),
        Err(CorpusError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        corpus.upsert([job(" ", "F", "Mid", vec![1.0, 0.0, 0.0])]),
        Err(CorpusError::InvalidReferenceJob { .. })
    ));
    assert!(corpus.is_empty());
}

#[test]
fn test_remove() {
    let corpus = seeded();
    assert!(corpus.remove("B"));
    assert!(!corpus.remove("B"));
    assert!(corpus.get("B").is_none());
    assert_eq!(corpus.len(), 3);
}

#[test]
fn test_reference_job_serde_skips_empty_embedding() {
    let job = ReferenceJob::new("E-1", "Engineer", "Engineering", "Mid", "Writes code");
    let json = serde_json::to_value(&job).unwrap();
    assert!(json.get("embedding").is_none());
    let back: ReferenceJob = serde_json::from_value(json).unwrap();
    assert_eq!(back, job);
}
