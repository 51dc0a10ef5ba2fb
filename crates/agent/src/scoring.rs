//! Lead completeness scoring
//!
//! The local fallback scorer sums four independent 25-point checks, each
//! strictly boolean with no partial credit within a check. It is fast,
//! deterministic and dependency-free, and is used only when no AI-provided
//! score is available or parseable.

use once_cell::sync::Lazy;
use regex::Regex;

use lead_desk_core::{FieldValue, LeadFields, QualityScore, ScoreSource};

static PROJECT_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;\n]+").expect("project-split regex"));

/// Compute the local completeness score, in {0, 25, 50, 75, 100}.
pub fn local_quality_score(fields: &LeadFields) -> u8 {
    let mut score = 0;

    // At least one external reference link
    if !fields.is_blank("website") || !fields.is_blank("competitor_examples") {
        score += 25;
    }

    // At least two distinct project/experience entries
    if project_count(fields.get("projects")) >= 2 {
        score += 25;
    }

    // Both a stated objective and a stated deadline
    if !fields.is_blank("objective") && !fields.is_blank("deadline") {
        score += 25;
    }

    // Contact reachability: phone AND email AND explicit consent
    if !fields.is_blank("phone") && !fields.is_blank("email") && fields.is_truthy("consent") {
        score += 25;
    }

    score
}

/// Count distinct entries in a free-text projects field, splitting on
/// comma/semicolon/newline and dropping blank segments.
fn project_count(value: &FieldValue) -> usize {
    match value {
        FieldValue::Text(text) => PROJECT_SPLIT
            .split(text)
            .filter(|segment| !segment.trim().is_empty())
            .count(),
        FieldValue::List(items) => items.iter().filter(|item| !item.trim().is_empty()).count(),
        _ => 0,
    }
}

/// Resolve the final quality score: an AI-provided score wins and is tagged
/// `ai`; otherwise the local score is used and tagged `local`.
pub fn resolve_score(ai_score: Option<u8>, local_score: u8) -> QualityScore {
    match ai_score {
        Some(value) => QualityScore {
            value: value.min(100),
            source: ScoreSource::Ai,
        },
        None => QualityScore {
            value: local_score,
            source: ScoreSource::Local,
        },
    }
}
