use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One entry of the job-taxonomy corpus.
pub struct ReferenceJob {
    pub code: String,
    pub title: String,
    pub family: String,
    /// Career level label (`entry`, `junior`, `mid`, `senior`, `lead`).
    pub career_level: String,
    pub description: String,
    /// Precomputed embedding. Empty when the backend does not return vectors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl ReferenceJob {
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        family: impl Into<String>,
        career_level: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            family: family.into(),
            career_level: career_level.into(),
            description: description.into(),
            embedding: Vec::new(),
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    /// Text a corpus loader embeds for this job.
    pub fn embedding_text(&self) -> String {
        format!(
            "{}\nJob family: {}; level: {}\n{}",
            self.title, self.family, self.career_level, self.description
        )
    }
}

#[derive(Debug, Clone)]
/// A retrieved reference job with its cosine similarity to the query.
pub struct Candidate {
    pub job: ReferenceJob,
    pub similarity: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Optional narrowing of a search. Matching is case-insensitive.
pub struct RetrievalFilters {
    pub family: Option<String>,
    pub career_level: Option<String>,
}

impl RetrievalFilters {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn career_level(mut self, level: impl Into<String>) -> Self {
        self.career_level = Some(level.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.family.is_none() && self.career_level.is_none()
    }

    pub fn accepts(&self, job: &ReferenceJob) -> bool {
        let family_ok = self
            .family
            .as_deref()
            .is_none_or(|f| f.eq_ignore_ascii_case(&job.family));
        let level_ok = self
            .career_level
            .as_deref()
            .is_none_or(|l| l.eq_ignore_ascii_case(&job.career_level));
        family_ok && level_ok
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
