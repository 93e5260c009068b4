use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Experience band used to pick the base salary table row.
pub enum ExperienceBucket {
    Entry,
    Junior,
    Mid,
    Senior,
    Lead,
}

impl ExperienceBucket {
    pub const ALL: [ExperienceBucket; 5] = [
        ExperienceBucket::Entry,
        ExperienceBucket::Junior,
        ExperienceBucket::Mid,
        ExperienceBucket::Senior,
        ExperienceBucket::Lead,
    ];

    /// entry < 2, junior < 4, mid < 7, senior < 10, lead otherwise.
    pub fn from_years(years: f64) -> Self {
        if years < 2.0 {
            ExperienceBucket::Entry
        } else if years < 4.0 {
            ExperienceBucket::Junior
        } else if years < 7.0 {
            ExperienceBucket::Mid
        } else if years < 10.0 {
            ExperienceBucket::Senior
        } else {
            ExperienceBucket::Lead
        }
    }

    /// Parses a career-level label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "entry" | "entry-level" | "entry level" => Some(ExperienceBucket::Entry),
            "junior" => Some(ExperienceBucket::Junior),
            "mid" | "mid-level" | "mid level" | "intermediate" => Some(ExperienceBucket::Mid),
            "senior" => Some(ExperienceBucket::Senior),
            "lead" | "principal" | "staff" => Some(ExperienceBucket::Lead),
            _ => None,
        }
    }

    /// Years that stand for this level when a request gives no experience range.
    pub fn representative_years(&self) -> f64 {
        match self {
            ExperienceBucket::Entry => 1.0,
            ExperienceBucket::Junior => 3.0,
            ExperienceBucket::Mid => 5.5,
            ExperienceBucket::Senior => 8.5,
            ExperienceBucket::Lead => 12.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceBucket::Entry => "entry",
            ExperienceBucket::Junior => "junior",
            ExperienceBucket::Mid => "mid",
            ExperienceBucket::Senior => "senior",
            ExperienceBucket::Lead => "lead",
        }
    }
}

impl std::fmt::Display for ExperienceBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
