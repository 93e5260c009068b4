use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamCategory {
    /// Min/max base salary per experience bucket.
    SalaryBand,
    IndustryAdjustment,
    CompanySizeFactor,
    /// Fractional premium per skill (0.15 = +15%).
    SkillPremium,
    /// Cost-of-labour multiplier per location.
    LocationIndex,
}

impl ParamCategory {
    pub const ALL: [ParamCategory; 5] = [
        ParamCategory::SalaryBand,
        ParamCategory::IndustryAdjustment,
        ParamCategory::CompanySizeFactor,
        ParamCategory::SkillPremium,
        ParamCategory::LocationIndex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamCategory::SalaryBand => "salary_band",
            ParamCategory::IndustryAdjustment => "industry_adjustment",
            ParamCategory::CompanySizeFactor => "company_size_factor",
            ParamCategory::SkillPremium => "skill_premium",
            ParamCategory::LocationIndex => "location_index",
        }
    }
}

impl std::fmt::Display for ParamCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Lookup key. The key text is trimmed and lowercased on construction.
pub struct ParamKey {
    category: ParamCategory,
    key: String,
}

impl ParamKey {
    pub fn new(category: ParamCategory, key: &str) -> Self {
        Self {
            category,
            key: normalize_key(key),
        }
    }

    pub fn category(&self) -> ParamCategory {
        self.category
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Display for ParamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.category, self.key)
    }
}

pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    /// Salary range in major currency units.
    Band { min: f64, max: f64 },
    Factor(f64),
}

impl ParamValue {
    pub fn as_band(&self) -> Option<(f64, f64)> {
        match *self {
            ParamValue::Band { min, max } => Some((min, max)),
            ParamValue::Factor(_) => None,
        }
    }

    pub fn as_factor(&self) -> Option<f64> {
        match *self {
            ParamValue::Factor(v) => Some(v),
            ParamValue::Band { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A parameter value together with the version it was published under.
pub struct ParamEntry {
    pub value: ParamValue,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// One published version of every pricing table.
pub struct ParameterSet {
    version: String,
    entries: BTreeMap<ParamKey, ParamValue>,
}

impl ParameterSet {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Same tables under another version id, for publishing an edited copy.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn band(mut self, bucket: &str, min: f64, max: f64) -> Self {
        self.entries.insert(
            ParamKey::new(ParamCategory::SalaryBand, bucket),
            ParamValue::Band { min, max },
        );
        self
    }

    pub fn factor(mut self, category: ParamCategory, key: &str, value: f64) -> Self {
        self.entries
            .insert(ParamKey::new(category, key), ParamValue::Factor(value));
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get(&self, key: &ParamKey) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &ParamValue)> {
        self.entries.iter()
    }

    /// Bands must be positive with `min <= max` under the salary-band category; factors
    /// must be finite and non-negative elsewhere.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.version.trim().is_empty() {
            return Err(StoreError::InvalidSet {
                reason: "version must not be empty".to_string(),
            });
        }
        for (key, value) in &self.entries {
            let problem = match (key.category(), value) {
                (ParamCategory::SalaryBand, ParamValue::Band { min, max }) => {
                    if !(min.is_finite() && max.is_finite()) || *min <= 0.0 || min > max {
                        Some(format!("band must satisfy 0 < min <= max, got [{min}, {max}]"))
                    } else {
                        None
                    }
                }
                (ParamCategory::SalaryBand, ParamValue::Factor(_)) => {
                    Some("salary_band entries must be bands".to_string())
                }
                (_, ParamValue::Band { .. }) => Some("only salary_band entries may be bands".to_string()),
                (_, ParamValue::Factor(v)) => {
                    if !v.is_finite() || *v < 0.0 {
                        Some(format!("factor must be finite and >= 0, got {v}"))
                    } else {
                        None
                    }
                }
            };
            if let Some(reason) = problem {
                return Err(StoreError::Corrupt {
                    category: key.category(),
                    key: key.key().to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }
}
