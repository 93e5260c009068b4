//! Query text construction for embedding.
//!
//! [`normalize`] is pure: no I/O, no clock, no randomness. Parts are emitted in a fixed
//! order and joined with newlines; blank parts are skipped.

use crate::constants::{DESCRIPTION_MAX_CHARS, MAX_ALTERNATIVE_TITLES, SPECIALIZATION_MAX_CHARS};
use crate::request::JobPricingRequest;

/// Builds the embedding text for a request.
///
/// Order: title, family/level hint, description (2,000 chars), up to five alternative
/// titles, specialization notes (500 chars).
pub fn normalize(request: &JobPricingRequest) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(5);

    parts.push(request.title().to_string());

    match (request.family_hint(), request.level_hint()) {
        (Some(family), Some(level)) => parts.push(format!("Job family: {family}; level: {level}")),
        (Some(family), None) => parts.push(format!("Job family: {family}")),
        (None, Some(level)) => parts.push(format!("Level: {level}")),
        (None, None) => {}
    }

    let description = truncate_chars(request.description(), DESCRIPTION_MAX_CHARS);
    if !description.is_empty() {
        parts.push(description.to_string());
    }

    let alternatives: Vec<&str> = request
        .alternative_titles()
        .iter()
        .take(MAX_ALTERNATIVE_TITLES)
        .map(String::as_str)
        .collect();
    if !alternatives.is_empty() {
        parts.push(format!("Also known as: {}", alternatives.join(", ")));
    }

    if let Some(notes) = request.specialization_notes() {
        let notes = truncate_chars(notes, SPECIALIZATION_MAX_CHARS);
        if !notes.is_empty() {
            parts.push(format!("Specialization: {notes}"));
        }
    }

    parts.join("\n")
}

/// Returns the longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
