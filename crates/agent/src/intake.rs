//! Lead intake orchestration
//!
//! One submission runs, strictly in sequence: required-field resolution,
//! the store insert, the single operator-email attempt, the single AI
//! summarization attempt, and the score-gated clarification decision.
//!
//! The insert is the only hard error: a lead without a persisted record is
//! not recoverable client-side. Everything after it is best-effort: a
//! failure is recorded on the stored document and logged, never surfaced
//! as a raw error to the end user.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use lead_desk_config::{format_price, Catalog};
use lead_desk_core::{
    AiBrief, AiOutcome, AiStatus, Clarifications, EmailStatus, LeadFields, LeadStatus,
    LeadSubmission, QualityScore, ServiceType,
};
use lead_desk_llm::{brief_prompt, parse_brief, ChatBackend, Message};
use lead_desk_notify::{lead_body, lead_subject, Mailer};
use lead_desk_persistence::LeadStore;

use crate::qualify::{needs_clarification, RequiredFieldResolver};
use crate::scoring::{local_quality_score, resolve_score};
use crate::AgentError;

/// Result of one lead submission.
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub lead: LeadSubmission,
    pub email_status: EmailStatus,
    pub quality: QualityScore,
    pub ai_status: AiStatus,
    /// Questions to surface: the AI's clarifying questions when available,
    /// the missing-field prompts otherwise.
    pub clarifying_questions: Vec<String>,
    /// The full brief, present only when the score clears the threshold.
    pub presented_brief: Option<AiBrief>,
}

/// Result of a clarification round.
#[derive(Debug, Clone)]
pub struct ClarifyOutcome {
    pub lead_id: Uuid,
    pub quality: QualityScore,
    pub ai_status: AiStatus,
    pub clarifying_questions: Vec<String>,
    pub presented_brief: Option<AiBrief>,
}

/// Lead intake pipeline over the store, mail and model seams.
pub struct LeadIntake {
    catalog: Arc<Catalog>,
    resolver: RequiredFieldResolver,
    leads: Arc<dyn LeadStore>,
    mailer: Arc<dyn Mailer>,
    backend: Option<Arc<dyn ChatBackend>>,
}

impl LeadIntake {
    pub fn new(
        catalog: Arc<Catalog>,
        leads: Arc<dyn LeadStore>,
        mailer: Arc<dyn Mailer>,
        backend: Option<Arc<dyn ChatBackend>>,
    ) -> Self {
        Self {
            resolver: RequiredFieldResolver::new(catalog.clone()),
            catalog,
            leads,
            mailer,
            backend,
        }
    }

    /// Handle one lead submission.
    pub async fn submit(
        &self,
        service: ServiceType,
        fields: LeadFields,
    ) -> Result<IntakeOutcome, AgentError> {
        let missing = self.resolver.resolve(&service, &fields);

        let mut lead = LeadSubmission::new(service, fields);
        lead.missing_fields = missing.keys;
        lead.clarifying_questions = missing.questions;

        // The one hard error in the pipeline
        let mut lead = self
            .leads
            .insert(lead)
            .await
            .map_err(|e| AgentError::Storage(e.to_string()))?;

        let email_status = self.notify_operator(&lead).await;
        lead.email_status = Some(email_status.clone());

        let (outcome, brief, quality) = self.summarize(&lead).await;
        let ai_status = outcome.status;
        lead.ai = Some(outcome);
        lead.quality = Some(quality);
        lead.brief = brief.clone();

        let clarifying_questions = surfaced_questions(&lead, brief.as_ref());
        let presented_brief = (!needs_clarification(quality.value))
            .then_some(brief)
            .flatten();

        Ok(IntakeOutcome {
            lead,
            email_status,
            quality,
            ai_status,
            clarifying_questions,
            presented_brief,
        })
    }

    /// Record clarification answers and re-run summarization and scoring.
    pub async fn clarify(
        &self,
        id: Uuid,
        answers: BTreeMap<String, String>,
        extra: Option<String>,
    ) -> Result<ClarifyOutcome, AgentError> {
        let mut lead = self
            .leads
            .get(id)
            .await?
            .ok_or(AgentError::NotFound(id))?;

        let clarifications = Clarifications {
            questions: surfaced_questions(&lead, lead.brief.as_ref()),
            answers,
            extra: extra.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            recorded_at: Utc::now(),
        };

        self.leads.record_clarifications(id, &clarifications).await?;
        lead.clarifications = Some(clarifications);
        lead.status = LeadStatus::Clarified;

        let (outcome, brief, quality) = self.summarize(&lead).await;
        let ai_status = outcome.status;
        lead.brief = brief.clone();

        let clarifying_questions = surfaced_questions(&lead, brief.as_ref());
        let presented_brief = (!needs_clarification(quality.value))
            .then_some(brief)
            .flatten();

        Ok(ClarifyOutcome {
            lead_id: id,
            quality,
            ai_status,
            clarifying_questions,
            presented_brief,
        })
    }

    /// Single email attempt; the outcome is recorded on the lead and never
    /// fails the request.
    async fn notify_operator(&self, lead: &LeadSubmission) -> EmailStatus {
        let status = if !self.mailer.is_configured() {
            EmailStatus::Skipped
        } else {
            // The price goes through the shared formatter, same as the chat
            // replies and the price listing.
            let price = self
                .catalog
                .prices
                .for_service(&lead.service_type)
                .map(format_price);
            match self
                .mailer
                .send(&lead_subject(lead), &lead_body(lead, price.as_deref()))
                .await
            {
                Ok(()) => EmailStatus::Sent,
                Err(e) => {
                    tracing::warn!(lead_id = %lead.id, error = %e, "Lead email failed");
                    EmailStatus::Failed(e.to_string())
                }
            }
        };

        if let Err(e) = self.leads.update_email_status(lead.id, &status).await {
            tracing::warn!(lead_id = %lead.id, error = %e, "Failed to record email status");
        }

        status
    }

    /// Single AI summarization attempt. Any failure, including a malformed
    /// response, resolves to the local fallback score with the reason
    /// recorded for audit.
    async fn summarize(
        &self,
        lead: &LeadSubmission,
    ) -> (AiOutcome, Option<AiBrief>, QualityScore) {
        let local_score = local_quality_score(&lead.fields);

        let (outcome, brief) = match &self.backend {
            None => (
                AiOutcome {
                    status: AiStatus::Failed,
                    model: "unconfigured".to_string(),
                    latency_ms: None,
                    error: Some("missing_api_key".to_string()),
                },
                None,
            ),
            Some(backend) => {
                let (system, user) = brief_prompt(lead);
                let started = Instant::now();
                let result = backend
                    .chat(&system, &[Message::user(user)])
                    .await
                    .and_then(|text| parse_brief(&text));
                let latency_ms = started.elapsed().as_millis() as u64;

                match result {
                    Ok(brief) => (
                        AiOutcome {
                            status: AiStatus::Success,
                            model: backend.model_id().to_string(),
                            latency_ms: Some(latency_ms),
                            error: None,
                        },
                        Some(brief),
                    ),
                    Err(e) => {
                        tracing::warn!(lead_id = %lead.id, error = %e, "AI summarization failed");
                        (
                            AiOutcome {
                                status: AiStatus::Failed,
                                model: backend.model_id().to_string(),
                                latency_ms: Some(latency_ms),
                                error: Some(e.to_string()),
                            },
                            None,
                        )
                    }
                }
            }
        };

        let ai_score = brief
            .as_ref()
            .and_then(|b| b.quality_score.as_ref())
            .map(|s| s.clamped());
        let quality = resolve_score(ai_score, local_score);

        if let Err(e) = self
            .leads
            .update_ai_result(lead.id, &outcome, quality, brief.as_ref())
            .await
        {
            tracing::warn!(lead_id = %lead.id, error = %e, "Failed to record AI result");
        }

        (outcome, brief, quality)
    }
}

/// AI clarifying questions win over the missing-field prompts when present.
fn surfaced_questions(lead: &LeadSubmission, brief: Option<&AiBrief>) -> Vec<String> {
    match brief {
        Some(brief) if !brief.clarifying_questions.is_empty() => {
            brief.clarifying_questions.clone()
        }
        _ => lead.clarifying_questions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lead_desk_config::Catalog;
    use lead_desk_core::ScoreSource;
    use lead_desk_llm::LlmError;
    use lead_desk_notify::{NoopMailer, NotifyError};
    use lead_desk_persistence::{InMemoryLeadStore, PersistenceError};
    use serde_json::json;

    struct ScriptedBackend {
        reply: Result<String, String>,
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn chat(&self, _system: &str, _messages: &[Message]) -> Result<String, LlmError> {
            self.reply.clone().map_err(LlmError::Api)
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _subject: &str, _body: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Transport("connection refused".to_string()))
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    fn intake(
        store: Arc<InMemoryLeadStore>,
        mailer: Arc<dyn Mailer>,
        backend: Option<Arc<dyn ChatBackend>>,
    ) -> LeadIntake {
        LeadIntake::new(Arc::new(Catalog::default()), store, mailer, backend)
    }

    fn complete_cv_fields() -> LeadFields {
        LeadFields::from_json_map(
            json!({
                "full_name": "Ama K.",
                "phone": "+22890000000",
                "email": "ama@example.com",
                "role": "Data analyst",
                "experience": "Acme, Globex, Initech",
                "projects": "dashboard ventes, pipeline data",
                "website": "https://linkedin.com/in/ama",
                "objective": "emploi",
                "deadline": "72h",
                "consent": true,
            })
            .as_object()
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_submit_without_model_uses_local_score() {
        let store = Arc::new(InMemoryLeadStore::new());
        let intake = intake(store.clone(), Arc::new(NoopMailer), None);

        let outcome = intake
            .submit(ServiceType::Cv, complete_cv_fields())
            .await
            .unwrap();

        assert!(!outcome.lead.id.is_nil());
        assert_eq!(outcome.email_status, EmailStatus::Skipped);
        assert_eq!(outcome.ai_status, AiStatus::Failed);
        assert_eq!(outcome.quality.value, 100);
        assert_eq!(outcome.quality.source, ScoreSource::Local);
        assert!(outcome.clarifying_questions.is_empty());

        let stored = store.get(outcome.lead.id).await.unwrap().unwrap();
        assert_eq!(stored.email_status, Some(EmailStatus::Skipped));
        assert_eq!(stored.ai.unwrap().error.as_deref(), Some("missing_api_key"));
    }

    #[tokio::test]
    async fn test_submit_with_ai_score_and_full_brief() {
        let backend = Arc::new(ScriptedBackend {
            reply: Ok(json!({
                "brief_summary": ["Brief clair"],
                "clarifying_questions": [],
                "quality_score": {"score": 85, "reasons": ["complet"]},
            })
            .to_string()),
        });
        let store = Arc::new(InMemoryLeadStore::new());
        let intake = intake(store.clone(), Arc::new(NoopMailer), Some(backend));

        let outcome = intake
            .submit(ServiceType::Cv, complete_cv_fields())
            .await
            .unwrap();

        assert_eq!(outcome.ai_status, AiStatus::Success);
        assert_eq!(outcome.quality.value, 85);
        assert_eq!(outcome.quality.source, ScoreSource::Ai);
        // Score clears the threshold: the full brief is presented
        assert!(outcome.presented_brief.is_some());
    }

    #[tokio::test]
    async fn test_low_ai_score_withholds_brief_and_surfaces_questions() {
        let backend = Arc::new(ScriptedBackend {
            reply: Ok(json!({
                "clarifying_questions": ["Quel est votre objectif principal ?"],
                "quality_score": 40,
            })
            .to_string()),
        });
        let store = Arc::new(InMemoryLeadStore::new());
        let intake = intake(store, Arc::new(NoopMailer), Some(backend));

        let outcome = intake
            .submit(ServiceType::Cv, complete_cv_fields())
            .await
            .unwrap();

        assert_eq!(outcome.quality.value, 40);
        assert!(outcome.presented_brief.is_none());
        assert_eq!(
            outcome.clarifying_questions,
            ["Quel est votre objectif principal ?"]
        );
    }

    #[tokio::test]
    async fn test_malformed_ai_response_falls_back_to_local() {
        let backend = Arc::new(ScriptedBackend {
            reply: Ok("je ne peux pas produire de JSON".to_string()),
        });
        let store = Arc::new(InMemoryLeadStore::new());
        let intake = intake(store.clone(), Arc::new(NoopMailer), Some(backend));

        let outcome = intake
            .submit(ServiceType::Cv, complete_cv_fields())
            .await
            .unwrap();

        assert_eq!(outcome.ai_status, AiStatus::Failed);
        assert_eq!(outcome.quality.source, ScoreSource::Local);

        // The failure reason is recorded on the stored document for audit
        let stored = store.get(outcome.lead.id).await.unwrap().unwrap();
        let error = stored.ai.unwrap().error.unwrap();
        assert!(error.contains("json_parse_failed"));
    }

    #[tokio::test]
    async fn test_email_failure_is_recorded_not_raised() {
        let store = Arc::new(InMemoryLeadStore::new());
        let intake = intake(store.clone(), Arc::new(FailingMailer), None);

        let outcome = intake
            .submit(ServiceType::Cv, complete_cv_fields())
            .await
            .unwrap();

        match &outcome.email_status {
            EmailStatus::Failed(reason) => assert!(reason.contains("connection refused")),
            other => panic!("expected failed status, got {:?}", other),
        }
        assert!(outcome.email_status.tag().starts_with("failed:"));
    }

    #[tokio::test]
    async fn test_missing_fields_surface_as_questions() {
        let store = Arc::new(InMemoryLeadStore::new());
        let intake = intake(store, Arc::new(NoopMailer), None);

        let fields = LeadFields::from_json_map(
            json!({
                "full_name": "Ama K.",
                "email": "ama@example.com",
                "role": "Data analyst",
                "experience": "3 ans",
                "deadline": "72h",
            })
            .as_object()
            .unwrap(),
        );
        let outcome = intake.submit(ServiceType::Cv, fields).await.unwrap();

        assert_eq!(outcome.lead.missing_fields, ["phone", "consent"]);
        assert_eq!(
            outcome.clarifying_questions,
            [
                "Merci de preciser: WhatsApp/Telephone",
                "Merci de preciser: Consentement"
            ]
        );
    }

    #[tokio::test]
    async fn test_clarify_reruns_summarization() {
        let backend = Arc::new(ScriptedBackend {
            reply: Ok(json!({
                "brief_summary": ["Complet apres precisions"],
                "quality_score": 75,
            })
            .to_string()),
        });
        let store = Arc::new(InMemoryLeadStore::new());
        let intake = intake(store.clone(), Arc::new(NoopMailer), Some(backend));

        let submitted = intake
            .submit(ServiceType::Cv, complete_cv_fields())
            .await
            .unwrap();

        let outcome = intake
            .clarify(
                submitted.lead.id,
                BTreeMap::from([("1".to_string(), "Objectif: CDI data".to_string())]),
                Some("Disponible des lundi".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(outcome.quality.value, 75);
        assert!(outcome.presented_brief.is_some());

        let stored = store.get(submitted.lead.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LeadStatus::Clarified);
        assert!(stored.clarifications.is_some());
    }

    #[tokio::test]
    async fn test_clarify_unknown_lead_is_not_found() {
        let store = Arc::new(InMemoryLeadStore::new());
        let intake = intake(store, Arc::new(NoopMailer), None);
        let err = intake
            .clarify(Uuid::new_v4(), BTreeMap::new(), None)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AgentError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_failure_is_the_hard_error() {
        struct FailingStore;

        #[async_trait]
        impl LeadStore for FailingStore {
            async fn insert(
                &self,
                _lead: LeadSubmission,
            ) -> Result<LeadSubmission, PersistenceError> {
                Err(PersistenceError::Query("no quorum".to_string()))
            }

            async fn get(
                &self,
                _id: Uuid,
            ) -> Result<Option<LeadSubmission>, PersistenceError> {
                Ok(None)
            }

            async fn update_email_status(
                &self,
                _id: Uuid,
                _status: &EmailStatus,
            ) -> Result<(), PersistenceError> {
                Ok(())
            }

            async fn update_ai_result(
                &self,
                _id: Uuid,
                _outcome: &AiOutcome,
                _quality: QualityScore,
                _brief: Option<&AiBrief>,
            ) -> Result<(), PersistenceError> {
                Ok(())
            }

            async fn record_clarifications(
                &self,
                _id: Uuid,
                _clarifications: &Clarifications,
            ) -> Result<(), PersistenceError> {
                Ok(())
            }
        }

        let intake = LeadIntake::new(
            Arc::new(Catalog::default()),
            Arc::new(FailingStore),
            Arc::new(NoopMailer),
            None,
        );
        let err = intake
            .submit(ServiceType::Cv, complete_cv_fields())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AgentError::Storage(_)));
    }
}
