//! Arbitration prompt construction and strict response decoding.

use serde::Deserialize;

use crate::corpus::Candidate;
use crate::normalize::truncate_chars;

use super::ArbitrationError;

const CANDIDATE_DESCRIPTION_MAX_CHARS: usize = 400;

const SYSTEM_PROMPT: &str = "You match job requisitions to a reference job taxonomy. \
Choose the single reference job that describes the same role at the same seniority, \
or reject all of them. Answer with one JSON object and nothing else. \
To choose: {\"decision\":\"match\",\"index\":<candidate number>,\"confidence\":<0.0-1.0>,\"rationale\":\"<one sentence>\"}. \
To reject: {\"decision\":\"no_match\",\"reason\":\"<one sentence>\"}.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitrationPrompt {
    pub system: String,
    pub user: String,
}

/// Lists candidates as numbered `[i] title (family, level): description` lines.
pub fn build_prompt(query_text: &str, candidates: &[Candidate]) -> ArbitrationPrompt {
    let mut user = String::with_capacity(query_text.len() + candidates.len() * 160);
    user.push_str("Requisition:\n");
    user.push_str(query_text);
    user.push_str("\n\nCandidates:\n");
    for (i, candidate) in candidates.iter().enumerate() {
        let job = &candidate.job;
        user.push_str(&format!(
            "[{i}] {} ({}, {}): {}\n",
            job.title,
            job.family,
            job.career_level,
            truncate_chars(job.description.trim(), CANDIDATE_DESCRIPTION_MAX_CHARS)
        ));
    }

    ArbitrationPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Decoded and range-checked answer.
pub enum Decision {
    Match {
        index: usize,
        confidence: f32,
        rationale: String,
    },
    NoMatch {
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DecisionKind {
    Match,
    NoMatch,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDecision {
    decision: DecisionKind,
    index: Option<usize>,
    confidence: Option<f64>,
    rationale: Option<String>,
    reason: Option<String>,
}

/// Strictly decodes a raw completion against `candidate_count` offered candidates.
///
/// Markdown code fences around the object are tolerated; anything else outside the
/// schema is an error.
pub fn decode_decision(raw: &str, candidate_count: usize) -> Result<Decision, ArbitrationError> {
    let body = strip_json_fences(raw);
    let parsed: RawDecision =
        serde_json::from_str(body).map_err(|e| ArbitrationError::MalformedResponse {
            reason: e.to_string(),
        })?;

    match parsed.decision {
        DecisionKind::Match => {
            let index = parsed
                .index
                .ok_or_else(|| ArbitrationError::MalformedResponse {
                    reason: "match decision without index".to_string(),
                })?;
            let confidence =
                parsed
                    .confidence
                    .ok_or_else(|| ArbitrationError::MalformedResponse {
                        reason: "match decision without confidence".to_string(),
                    })?;
            if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
                return Err(ArbitrationError::ConfidenceOutOfRange { value: confidence });
            }
            if index >= candidate_count {
                return Err(ArbitrationError::IndexOutOfRange {
                    index,
                    candidates: candidate_count,
                });
            }
            Ok(Decision::Match {
                index,
                confidence: confidence as f32,
                rationale: parsed.rationale.unwrap_or_default(),
            })
        }
        DecisionKind::NoMatch => Ok(Decision::NoMatch {
            reason: parsed
                .reason
                .or(parsed.rationale)
                .unwrap_or_else(|| "no candidate accepted".to_string()),
        }),
    }
}

fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
