//! Lead submission records and service types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::brief::AiBrief;
use crate::field::LeadFields;

/// Legacy one/two-letter mode codes accepted by older callers.
///
/// Unmapped codes pass through as [`ServiceType::Other`].
const MODE_CODES: &[(&str, ServiceType)] = &[
    ("p", ServiceType::Portfolio),
    ("pf", ServiceType::Portfolio),
    ("v", ServiceType::Vitrine),
    ("sv", ServiceType::Vitrine),
    ("c", ServiceType::Cv),
    ("cv", ServiceType::Cv),
    ("l", ServiceType::Lettre),
    ("lm", ServiceType::Lettre),
    ("pk", ServiceType::Pack),
];

/// Service category of a lead. Immutable once the lead is created; selects
/// the required-field set and the price that applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    Portfolio,
    Vitrine,
    Cv,
    Lettre,
    /// CV + lettre de motivation combo.
    Pack,
    /// Unmapped legacy code, stored as-is.
    Other(String),
}

impl ServiceType {
    /// Canonical lowercase name, as stored and exchanged on the wire.
    pub fn canonical_name(&self) -> &str {
        match self {
            ServiceType::Portfolio => "portfolio",
            ServiceType::Vitrine => "vitrine",
            ServiceType::Cv => "cv",
            ServiceType::Lettre => "lettre",
            ServiceType::Pack => "pack",
            ServiceType::Other(name) => name.as_str(),
        }
    }

    /// Human-facing French label.
    pub fn display_name(&self) -> &str {
        match self {
            ServiceType::Portfolio => "portfolio",
            ServiceType::Vitrine => "site vitrine",
            ServiceType::Cv => "CV",
            ServiceType::Lettre => "lettre de motivation",
            ServiceType::Pack => "pack CV + lettre",
            ServiceType::Other(name) => name.as_str(),
        }
    }

    /// Resolve a canonical name or a legacy mode code.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "portfolio" => ServiceType::Portfolio,
            "vitrine" => ServiceType::Vitrine,
            "cv" => ServiceType::Cv,
            "lettre" => ServiceType::Lettre,
            "pack" => ServiceType::Pack,
            code => MODE_CODES
                .iter()
                .find(|(c, _)| *c == code)
                .map(|(_, t)| t.clone())
                .unwrap_or_else(|| ServiceType::Other(code.to_string())),
        }
    }

    /// True for the catalog-backed categories (everything but `Other`).
    pub fn is_known(&self) -> bool {
        !matches!(self, ServiceType::Other(_))
    }

    /// The four single-service categories, in catalog order.
    pub fn single_services() -> [ServiceType; 4] {
        [
            ServiceType::Portfolio,
            ServiceType::Vitrine,
            ServiceType::Cv,
            ServiceType::Lettre,
        ]
    }
}

impl From<String> for ServiceType {
    fn from(raw: String) -> Self {
        ServiceType::parse(&raw)
    }
}

impl From<ServiceType> for String {
    fn from(service: ServiceType) -> Self {
        service.canonical_name().to_string()
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

/// Lead lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    /// Clarification answers were recorded after submission.
    Clarified,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Clarified => "clarified",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "clarified" => LeadStatus::Clarified,
            _ => LeadStatus::New,
        }
    }
}

/// Outcome of the single operator-email attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Sent,
    /// Email credentials absent; delivery not attempted.
    Skipped,
    Failed(String),
}

impl EmailStatus {
    /// Wire tag: `sent`, `skipped` or `failed:<reason>`.
    pub fn tag(&self) -> String {
        match self {
            EmailStatus::Sent => "sent".to_string(),
            EmailStatus::Skipped => "skipped".to_string(),
            EmailStatus::Failed(reason) => format!("failed:{}", reason),
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "sent" => EmailStatus::Sent,
            "skipped" => EmailStatus::Skipped,
            other => EmailStatus::Failed(
                other.strip_prefix("failed:").unwrap_or(other).to_string(),
            ),
        }
    }
}

/// Which scorer produced the quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Ai,
    Local,
}

impl ScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreSource::Ai => "ai",
            ScoreSource::Local => "local",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "ai" => ScoreSource::Ai,
            _ => ScoreSource::Local,
        }
    }
}

/// Completeness signal attached to a lead, 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityScore {
    pub value: u8,
    pub source: ScoreSource,
}

/// Outcome of the AI summarization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiStatus {
    Success,
    Failed,
}

impl AiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiStatus::Success => "success",
            AiStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "success" => AiStatus::Success,
            _ => AiStatus::Failed,
        }
    }
}

/// Audit record of one AI summarization attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiOutcome {
    pub status: AiStatus,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Clarification answers recorded after an incomplete submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clarifications {
    pub questions: Vec<String>,
    pub answers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// One prospective client's brief.
///
/// `missing_fields` is always exactly the subset of the service type's
/// required fields whose value is empty; the resolver recomputes it on every
/// write. Leads are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub id: Uuid,
    pub service_type: ServiceType,
    pub fields: LeadFields,
    pub status: LeadStatus,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub missing_fields: Vec<String>,
    #[serde(default)]
    pub clarifying_questions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_status: Option<EmailStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief: Option<AiBrief>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarifications: Option<Clarifications>,
}

impl LeadSubmission {
    /// Create a draft submission. The store assigns the identifier at
    /// insert; until then it is nil.
    pub fn new(service_type: ServiceType, fields: LeadFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            service_type,
            fields,
            status: LeadStatus::New,
            source: "api".to_string(),
            created_at: now,
            updated_at: now,
            missing_fields: Vec::new(),
            clarifying_questions: Vec::new(),
            email_status: None,
            ai: None,
            quality: None,
            brief: None,
            clarifications: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_code_mapping() {
        assert_eq!(ServiceType::parse("cv"), ServiceType::Cv);
        assert_eq!(ServiceType::parse("c"), ServiceType::Cv);
        assert_eq!(ServiceType::parse("pf"), ServiceType::Portfolio);
        assert_eq!(ServiceType::parse("lm"), ServiceType::Lettre);
        assert_eq!(ServiceType::parse("PK"), ServiceType::Pack);
    }

    #[test]
    fn test_unmapped_code_passes_through() {
        let service = ServiceType::parse("xz");
        assert_eq!(service, ServiceType::Other("xz".to_string()));
        assert_eq!(service.canonical_name(), "xz");
        assert!(!service.is_known());
    }

    #[test]
    fn test_service_type_serde() {
        let json = serde_json::to_string(&ServiceType::Lettre).unwrap();
        assert_eq!(json, "\"lettre\"");
        let back: ServiceType = serde_json::from_str("\"lm\"").unwrap();
        assert_eq!(back, ServiceType::Lettre);
    }

    #[test]
    fn test_email_status_tag() {
        assert_eq!(EmailStatus::Sent.tag(), "sent");
        assert_eq!(
            EmailStatus::Failed("smtp timeout".to_string()).tag(),
            "failed:smtp timeout"
        );
        assert_eq!(
            EmailStatus::from_tag("failed:auth"),
            EmailStatus::Failed("auth".to_string())
        );
        assert_eq!(EmailStatus::from_tag("skipped"), EmailStatus::Skipped);
    }
}
