//! Lead submission persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use lead_desk_core::{
    AiBrief, AiOutcome, Clarifications, EmailStatus, LeadFields, LeadStatus, LeadSubmission,
    QualityScore, ScoreSource, ServiceType,
};

use crate::{PersistenceError, ScyllaClient};

/// Lead store trait.
///
/// The store assigns the lead identifier at insert. Leads are updated in
/// place a few times after creation (email outcome, AI outcome,
/// clarifications) and never deleted.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Persist a new lead, assigning its identifier. Returns the stored lead.
    async fn insert(&self, lead: LeadSubmission) -> Result<LeadSubmission, PersistenceError>;

    async fn get(&self, id: Uuid) -> Result<Option<LeadSubmission>, PersistenceError>;

    async fn update_email_status(
        &self,
        id: Uuid,
        status: &EmailStatus,
    ) -> Result<(), PersistenceError>;

    /// Record one AI summarization attempt and the resolved quality score.
    async fn update_ai_result(
        &self,
        id: Uuid,
        outcome: &AiOutcome,
        quality: QualityScore,
        brief: Option<&AiBrief>,
    ) -> Result<(), PersistenceError>;

    /// Record clarification answers; the lead moves to `clarified`.
    async fn record_clarifications(
        &self,
        id: Uuid,
        clarifications: &Clarifications,
    ) -> Result<(), PersistenceError>;
}

/// ScyllaDB implementation of the lead store
#[derive(Clone)]
pub struct ScyllaLeadStore {
    client: ScyllaClient,
}

impl ScyllaLeadStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LeadStore for ScyllaLeadStore {
    async fn insert(&self, mut lead: LeadSubmission) -> Result<LeadSubmission, PersistenceError> {
        if lead.id.is_nil() {
            lead.id = Uuid::new_v4();
        }
        lead.updated_at = Utc::now();

        let query = format!(
            "INSERT INTO {}.leads (
                lead_id, service_type, fields_json, status, source,
                created_at, updated_at, missing_fields_json, questions_json,
                email_status, quality_score, score_source
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    lead.id,
                    lead.service_type.canonical_name(),
                    encode_json(&lead.fields)?,
                    lead.status.as_str(),
                    &lead.source,
                    lead.created_at.timestamp_millis(),
                    lead.updated_at.timestamp_millis(),
                    encode_json(&lead.missing_fields)?,
                    encode_json(&lead.clarifying_questions)?,
                    lead.email_status.as_ref().map(EmailStatus::tag),
                    lead.quality.map(|q| q.value as i32),
                    lead.quality.map(|q| q.source.as_str()),
                ),
            )
            .await?;

        tracing::info!(
            lead_id = %lead.id,
            service_type = %lead.service_type,
            missing = lead.missing_fields.len(),
            "Lead stored in ScyllaDB"
        );

        Ok(lead)
    }

    async fn get(&self, id: Uuid) -> Result<Option<LeadSubmission>, PersistenceError> {
        let query = format!(
            "SELECT lead_id, service_type, fields_json, status, source,
                    created_at, updated_at, missing_fields_json, questions_json,
                    email_status, ai_json, ai_brief_json, quality_score,
                    score_source, clarifications_json
             FROM {}.leads WHERE lead_id = ?",
            self.client.keyspace()
        );

        let result = self.client.session().query_unpaged(query, (id,)).await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                return Ok(Some(row_to_lead(row)?));
            }
        }

        Ok(None)
    }

    async fn update_email_status(
        &self,
        id: Uuid,
        status: &EmailStatus,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.leads SET email_status = ?, updated_at = ? WHERE lead_id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(query, (status.tag(), Utc::now().timestamp_millis(), id))
            .await?;

        tracing::info!(lead_id = %id, email_status = %status.tag(), "Lead email status updated");

        Ok(())
    }

    async fn update_ai_result(
        &self,
        id: Uuid,
        outcome: &AiOutcome,
        quality: QualityScore,
        brief: Option<&AiBrief>,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.leads SET
                ai_json = ?, ai_brief_json = ?, quality_score = ?,
                score_source = ?, updated_at = ?
             WHERE lead_id = ?",
            self.client.keyspace()
        );

        let brief_json = match brief {
            Some(brief) => Some(encode_json(brief)?),
            None => None,
        };

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    encode_json(outcome)?,
                    brief_json,
                    quality.value as i32,
                    quality.source.as_str(),
                    Utc::now().timestamp_millis(),
                    id,
                ),
            )
            .await?;

        tracing::info!(
            lead_id = %id,
            ai_status = outcome.status.as_str(),
            score = quality.value,
            source = quality.source.as_str(),
            "Lead AI result updated"
        );

        Ok(())
    }

    async fn record_clarifications(
        &self,
        id: Uuid,
        clarifications: &Clarifications,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.leads SET clarifications_json = ?, status = ?, updated_at = ?
             WHERE lead_id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    encode_json(clarifications)?,
                    LeadStatus::Clarified.as_str(),
                    Utc::now().timestamp_millis(),
                    id,
                ),
            )
            .await?;

        tracing::info!(lead_id = %id, "Lead clarifications recorded");

        Ok(())
    }
}

type LeadRow = (
    Uuid,
    String,
    String,
    String,
    String,
    i64,
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<i32>,
    Option<String>,
    Option<String>,
);

fn row_to_lead(
    row: scylla::frame::response::result::Row,
) -> Result<LeadSubmission, PersistenceError> {
    let (
        lead_id,
        service_type,
        fields_json,
        status,
        source,
        created_at,
        updated_at,
        missing_fields_json,
        questions_json,
        email_status,
        ai_json,
        ai_brief_json,
        quality_score,
        score_source,
        clarifications_json,
    ): LeadRow = row
        .into_typed()
        .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

    let fields: LeadFields = decode_json(&fields_json)?;

    let ai: Option<AiOutcome> = ai_json.as_deref().and_then(|s| serde_json::from_str(s).ok());

    let quality = quality_score.map(|value| QualityScore {
        value: value.clamp(0, 100) as u8,
        source: score_source
            .as_deref()
            .map(ScoreSource::from_str)
            .unwrap_or(ScoreSource::Local),
    });

    Ok(LeadSubmission {
        id: lead_id,
        service_type: ServiceType::parse(&service_type),
        fields,
        status: LeadStatus::from_str(&status),
        source,
        created_at: millis_to_datetime(created_at),
        updated_at: millis_to_datetime(updated_at),
        missing_fields: decode_json_or_default(missing_fields_json.as_deref()),
        clarifying_questions: decode_json_or_default(questions_json.as_deref()),
        email_status: email_status.as_deref().map(EmailStatus::from_tag),
        ai,
        quality,
        brief: ai_brief_json.as_deref().and_then(|s| serde_json::from_str(s).ok()),
        clarifications: clarifications_json
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok()),
    })
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, PersistenceError> {
    serde_json::to_string(value).map_err(|e| PersistenceError::InvalidData(e.to_string()))
}

fn decode_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, PersistenceError> {
    serde_json::from_str(raw).map_err(|e| PersistenceError::InvalidData(e.to_string()))
}

fn decode_json_or_default<T: serde::de::DeserializeOwned + Default>(raw: Option<&str>) -> T {
    raw.and_then(|s| serde_json::from_str(s).ok()).unwrap_or_default()
}

/// In-memory lead store for development and tests
#[derive(Default)]
pub struct InMemoryLeadStore {
    leads: DashMap<Uuid, LeadSubmission>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn insert(&self, mut lead: LeadSubmission) -> Result<LeadSubmission, PersistenceError> {
        if lead.id.is_nil() {
            lead.id = Uuid::new_v4();
        }
        lead.updated_at = Utc::now();
        self.leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    async fn get(&self, id: Uuid) -> Result<Option<LeadSubmission>, PersistenceError> {
        Ok(self.leads.get(&id).map(|entry| entry.clone()))
    }

    async fn update_email_status(
        &self,
        id: Uuid,
        status: &EmailStatus,
    ) -> Result<(), PersistenceError> {
        let mut entry = self
            .leads
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        entry.email_status = Some(status.clone());
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn update_ai_result(
        &self,
        id: Uuid,
        outcome: &AiOutcome,
        quality: QualityScore,
        brief: Option<&AiBrief>,
    ) -> Result<(), PersistenceError> {
        let mut entry = self
            .leads
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        entry.ai = Some(outcome.clone());
        entry.quality = Some(quality);
        entry.brief = brief.cloned();
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn record_clarifications(
        &self,
        id: Uuid,
        clarifications: &Clarifications,
    ) -> Result<(), PersistenceError> {
        let mut entry = self
            .leads
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        entry.clarifications = Some(clarifications.clone());
        entry.status = LeadStatus::Clarified;
        entry.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_desk_core::{AiStatus, FieldValue};
    use std::collections::BTreeMap;

    fn sample_lead() -> LeadSubmission {
        let mut fields = LeadFields::new();
        fields.insert("full_name", FieldValue::Text("Ama K.".to_string()));
        fields.insert("consent", FieldValue::Flag(true));
        LeadSubmission::new(ServiceType::Cv, fields)
    }

    #[tokio::test]
    async fn test_insert_assigns_identifier() {
        let store = InMemoryLeadStore::new();
        let stored = store.insert(sample_lead()).await.unwrap();
        assert!(!stored.id.is_nil());

        let fetched = store.get(stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.service_type, ServiceType::Cv);
        assert_eq!(fetched.fields.text("full_name"), Some("Ama K."));
    }

    #[tokio::test]
    async fn test_update_email_and_ai_outcome() {
        let store = InMemoryLeadStore::new();
        let stored = store.insert(sample_lead()).await.unwrap();

        store
            .update_email_status(stored.id, &EmailStatus::Sent)
            .await
            .unwrap();

        let outcome = AiOutcome {
            status: AiStatus::Failed,
            model: "command-a-03-2025".to_string(),
            latency_ms: Some(812),
            error: Some("json_parse_failed".to_string()),
        };
        store
            .update_ai_result(
                stored.id,
                &outcome,
                QualityScore {
                    value: 50,
                    source: ScoreSource::Local,
                },
                None,
            )
            .await
            .unwrap();

        let lead = store.get(stored.id).await.unwrap().unwrap();
        assert_eq!(lead.email_status, Some(EmailStatus::Sent));
        assert_eq!(lead.ai.as_ref().unwrap().status, AiStatus::Failed);
        assert_eq!(lead.quality.unwrap().value, 50);
        assert!(lead.brief.is_none());
    }

    #[tokio::test]
    async fn test_record_clarifications_moves_status() {
        let store = InMemoryLeadStore::new();
        let stored = store.insert(sample_lead()).await.unwrap();

        let clarifications = Clarifications {
            questions: vec!["Merci de preciser: Delai".to_string()],
            answers: BTreeMap::from([("1".to_string(), "48h".to_string())]),
            extra: None,
            recorded_at: Utc::now(),
        };
        store
            .record_clarifications(stored.id, &clarifications)
            .await
            .unwrap();

        let lead = store.get(stored.id).await.unwrap().unwrap();
        assert_eq!(lead.status, LeadStatus::Clarified);
        assert_eq!(lead.clarifications.unwrap().answers.len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_lead_is_not_found() {
        let store = InMemoryLeadStore::new();
        let err = store
            .update_email_status(Uuid::new_v4(), &EmailStatus::Skipped)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, PersistenceError::NotFound(_)));
    }
}
