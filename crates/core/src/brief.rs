//! Structured AI brief result
//!
//! The summarization model is asked for a JSON document with a fixed schema,
//! but a hosted model cannot be trusted to honor it. [`AiBrief::from_json`]
//! accepts the recognized keys leniently and ignores everything else; a
//! response that is not a JSON object is rejected outright and never
//! partially trusted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One section of the proposed plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSection {
    pub section: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub priority: String,
}

/// Price / delay / risk estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_days: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
}

/// Quality score as returned by the model: either a bare number or an
/// object with a `score` and optional `reasons`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreValue {
    pub score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl ScoreValue {
    /// Score clamped into the 0-100 invariant.
    pub fn clamped(&self) -> u8 {
        self.score.clamp(0.0, 100.0) as u8
    }
}

/// The recognized keys of a summarization response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiBrief {
    #[serde(default)]
    pub brief_summary: Vec<String>,
    #[serde(default)]
    pub clarifying_questions: Vec<String>,
    #[serde(default)]
    pub plan: Vec<PlanSection>,
    #[serde(default)]
    pub assets_checklist: Vec<String>,
    #[serde(default)]
    pub deliverables: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<Estimate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<ScoreValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_message: Option<String>,
    #[serde(default)]
    pub internal_tags: Vec<String>,
}

impl AiBrief {
    /// Build from a parsed model response. Returns `None` unless the value
    /// is a JSON object; every recognized key is read leniently and
    /// malformed entries are dropped, never propagated.
    pub fn from_json(value: &Value) -> Option<Self> {
        let map = value.as_object()?;

        Some(Self {
            brief_summary: normalize_list(map.get("brief_summary")),
            clarifying_questions: normalize_list(map.get("clarifying_questions")),
            plan: normalize_plan(map.get("plan").or_else(|| map.get("portfolio_plan"))),
            assets_checklist: normalize_list(map.get("assets_checklist")),
            deliverables: normalize_list(map.get("deliverables")),
            estimate: map.get("estimate").and_then(normalize_estimate),
            quality_score: map.get("quality_score").and_then(normalize_score),
            whatsapp_message: map
                .get("whatsapp_message")
                .and_then(non_blank_text),
            email_message: map.get("email_message").and_then(non_blank_text),
            internal_tags: normalize_list(map.get("internal_tags")),
        })
    }
}

/// Accept a list of strings either as a JSON array or as a newline-separated
/// string; trim entries and drop blanks.
pub fn normalize_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn normalize_plan(value: Option<&Value>) -> Vec<PlanSection> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let map = item.as_object()?;
            Some(PlanSection {
                section: map
                    .get("section")
                    .and_then(Value::as_str)
                    .unwrap_or("Section")
                    .to_string(),
                content: map
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                priority: map
                    .get("priority")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect()
}

fn normalize_estimate(value: &Value) -> Option<Estimate> {
    let map = value.as_object()?;
    Some(Estimate {
        price_range: map.get("price_range").and_then(non_blank_text),
        eta_days: map.get("eta_days").and_then(lenient_number),
        risk_level: map.get("risk_level").and_then(non_blank_text),
    })
}

fn normalize_score(value: &Value) -> Option<ScoreValue> {
    match value {
        Value::Number(n) => Some(ScoreValue {
            score: n.as_f64()?,
            reasons: Vec::new(),
        }),
        Value::Object(map) => Some(ScoreValue {
            score: map.get("score").and_then(lenient_number)?,
            reasons: normalize_list(map.get("reasons")),
        }),
        _ => None,
    }
}

fn non_blank_text(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_is_rejected() {
        assert!(AiBrief::from_json(&json!("just text")).is_none());
        assert!(AiBrief::from_json(&json!([1, 2, 3])).is_none());
        assert!(AiBrief::from_json(&json!(42)).is_none());
    }

    #[test]
    fn test_list_from_string_lines() {
        let brief = AiBrief::from_json(&json!({
            "brief_summary": "ligne une\n\n  ligne deux  ",
        }))
        .unwrap();
        assert_eq!(brief.brief_summary, vec!["ligne une", "ligne deux"]);
    }

    #[test]
    fn test_score_shapes() {
        let bare = AiBrief::from_json(&json!({"quality_score": 72})).unwrap();
        assert_eq!(bare.quality_score.unwrap().clamped(), 72);

        let detailed = AiBrief::from_json(&json!({
            "quality_score": {"score": 55, "reasons": ["pas de liens"]}
        }))
        .unwrap();
        let score = detailed.quality_score.unwrap();
        assert_eq!(score.clamped(), 55);
        assert_eq!(score.reasons, vec!["pas de liens"]);

        let invalid = AiBrief::from_json(&json!({"quality_score": "high"})).unwrap();
        assert!(invalid.quality_score.is_none());
    }

    #[test]
    fn test_plan_skips_non_objects() {
        let brief = AiBrief::from_json(&json!({
            "plan": [
                {"section": "Accueil", "content": "hero", "priority": "high"},
                "pas une section",
                {"content": "sans titre"},
            ]
        }))
        .unwrap();
        assert_eq!(brief.plan.len(), 2);
        assert_eq!(brief.plan[0].section, "Accueil");
        assert_eq!(brief.plan[1].section, "Section");
    }

    #[test]
    fn test_score_clamped_to_invariant() {
        let brief = AiBrief::from_json(&json!({"quality_score": 140})).unwrap();
        assert_eq!(brief.quality_score.unwrap().clamped(), 100);
    }

    #[test]
    fn test_serde_round_trip() {
        let brief = AiBrief::from_json(&json!({
            "brief_summary": ["ok"],
            "estimate": {"price_range": "29 900 CFA", "eta_days": "5", "risk_level": "low"},
        }))
        .unwrap();
        assert_eq!(brief.estimate.as_ref().unwrap().eta_days, Some(5.0));
        let back: AiBrief =
            serde_json::from_value(serde_json::to_value(&brief).unwrap()).unwrap();
        assert_eq!(back, brief);
    }
}
