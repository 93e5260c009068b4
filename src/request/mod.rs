//! Job pricing requests.
//!
//! Callers fill a [`JobPricingDraft`] and turn it into an immutable
//! [`JobPricingRequest`] with [`JobPricingDraft::validate`]. All field-level checks run
//! there, once; the rest of the pipeline can rely on a validated request.

pub mod error;
pub mod lifecycle;


pub use error::ValidationError;
pub use lifecycle::{RequestRecord, RequestStatus, StatusTransitionError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hashing::hash_fields;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 50_000;
pub const MAX_SKILLS: usize = 50;
pub const MAX_ALTERNATIVE_TITLES_ACCEPTED: usize = 20;
pub const MAX_YEARS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }
}

/// Unvalidated request fields, as received from the surrounding service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPricingDraft {
    pub id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub years_min: Option<f64>,
    pub years_max: Option<f64>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub alternative_titles: Vec<String>,
    pub family_hint: Option<String>,
    pub level_hint: Option<String>,
    pub specialization_notes: Option<String>,
}

impl JobPricingDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn experience(mut self, min: f64, max: f64) -> Self {
        self.years_min = Some(min);
        self.years_max = Some(max);
        self
    }

    pub fn industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn company_size(mut self, size: impl Into<String>) -> Self {
        self.company_size = Some(size.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn alternative_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternative_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn family_hint(mut self, family: impl Into<String>) -> Self {
        self.family_hint = Some(family.into());
        self
    }

    pub fn level_hint(mut self, level: impl Into<String>) -> Self {
        self.level_hint = Some(level.into());
        self
    }

    pub fn specialization_notes(mut self, notes: impl Into<String>) -> Self {
        self.specialization_notes = Some(notes.into());
        self
    }

    /// Runs every field validator and produces an immutable request.
    pub fn validate(self) -> Result<JobPricingRequest, ValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyField { field: "title" });
        }
        check_len("title", &title, MAX_TITLE_CHARS)?;

        let description = self.description.trim().to_string();
        check_len("description", &description, MAX_DESCRIPTION_CHARS)?;

        let years_min = check_years("years_min", self.years_min)?;
        let years_max = check_years("years_max", self.years_max)?;
        if let (Some(min), Some(max)) = (years_min, years_max)
            && min > max
        {
            return Err(ValidationError::InvertedExperienceRange { min, max });
        }

        let skills = dedupe_case_insensitive(clean_list(self.skills));
        if skills.len() > MAX_SKILLS {
            return Err(ValidationError::TooManyItems {
                field: "skills",
                max: MAX_SKILLS,
                actual: skills.len(),
            });
        }

        let alternative_titles = clean_list(self.alternative_titles);
        if alternative_titles.len() > MAX_ALTERNATIVE_TITLES_ACCEPTED {
            return Err(ValidationError::TooManyItems {
                field: "alternative_titles",
                max: MAX_ALTERNATIVE_TITLES_ACCEPTED,
                actual: alternative_titles.len(),
            });
        }
        for alt in &alternative_titles {
            check_len("alternative_titles", alt, MAX_TITLE_CHARS)?;
        }

        Ok(JobPricingRequest {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            title,
            description,
            years_min,
            years_max,
            industry: clean_optional(self.industry),
            company_size: clean_optional(self.company_size),
            location: clean_optional(self.location),
            urgency: self.urgency,
            skills,
            alternative_titles,
            family_hint: clean_optional(self.family_hint),
            level_hint: clean_optional(self.level_hint),
            specialization_notes: clean_optional(self.specialization_notes),
        })
    }
}

/// A validated, immutable job pricing request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPricingRequest {
    id: Uuid,
    title: String,
    description: String,
    years_min: Option<f64>,
    years_max: Option<f64>,
    industry: Option<String>,
    company_size: Option<String>,
    location: Option<String>,
    urgency: Urgency,
    skills: Vec<String>,
    alternative_titles: Vec<String>,
    family_hint: Option<String>,
    level_hint: Option<String>,
    specialization_notes: Option<String>,
}

impl JobPricingRequest {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn years_min(&self) -> Option<f64> {
        self.years_min
    }

    pub fn years_max(&self) -> Option<f64> {
        self.years_max
    }

    /// Average of the supplied bounds; a single bound stands for both.
    pub fn average_years(&self) -> Option<f64> {
        match (self.years_min, self.years_max) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            (Some(v), None) | (None, Some(v)) => Some(v),
            (None, None) => None,
        }
    }

    pub fn has_experience(&self) -> bool {
        self.years_min.is_some() || self.years_max.is_some()
    }

    pub fn industry(&self) -> Option<&str> {
        self.industry.as_deref()
    }

    pub fn company_size(&self) -> Option<&str> {
        self.company_size.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn urgency(&self) -> Urgency {
        self.urgency
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn alternative_titles(&self) -> &[String] {
        &self.alternative_titles
    }

    pub fn family_hint(&self) -> Option<&str> {
        self.family_hint.as_deref()
    }

    pub fn level_hint(&self) -> Option<&str> {
        self.level_hint.as_deref()
    }

    pub fn specialization_notes(&self) -> Option<&str> {
        self.specialization_notes.as_deref()
    }

    /// Hex digest of every field except the id. Two submissions of the same
    /// requisition share a fingerprint.
    pub fn content_fingerprint(&self) -> String {
        let years = |v: Option<f64>| v.map(|y| y.to_string()).unwrap_or_default();
        let (years_min, years_max) = (years(self.years_min), years(self.years_max));
        let skills = self.skills.join("\u{1f}");
        let alternative_titles = self.alternative_titles.join("\u{1f}");

        let digest = hash_fields(&[
            self.title.as_str(),
            self.description.as_str(),
            years_min.as_str(),
            years_max.as_str(),
            self.industry().unwrap_or_default(),
            self.company_size().unwrap_or_default(),
            self.location().unwrap_or_default(),
            self.urgency.as_str(),
            skills.as_str(),
            alternative_titles.as_str(),
            self.family_hint().unwrap_or_default(),
            self.level_hint().unwrap_or_default(),
            self.specialization_notes().unwrap_or_default(),
        ]);
        blake3::Hash::from(digest).to_hex().to_string()
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

fn check_years(field: &'static str, value: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(v) if !v.is_finite() || !(0.0..=MAX_YEARS).contains(&v) => {
            Err(ValidationError::InvalidYears { field, value: v })
        }
        other => Ok(other),
    }
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn dedupe_case_insensitive(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect()
}
