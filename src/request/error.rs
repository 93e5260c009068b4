use thiserror::Error;

/// Malformed request fields, reported before any pipeline stage runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("field '{field}' is too long: {actual} chars (max {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("field '{field}' has invalid years of experience: {value}")]
    InvalidYears { field: &'static str, value: f64 },

    #[error("experience range is inverted: min {min} > max {max}")]
    InvertedExperienceRange { min: f64, max: f64 },

    #[error("field '{field}' has too many entries: {actual} (max {max})")]
    TooManyItems {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// No experience bounds and no matched reference job to infer them from.
    #[error("experience could not be resolved: no years supplied and no career level to infer from")]
    ExperienceUnresolved,
}
