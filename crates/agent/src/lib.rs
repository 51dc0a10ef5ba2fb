//! Chat-reply resolution and lead-qualification pipeline
//!
//! Features:
//! - Ordered keyword intent classification
//! - Deterministic, policy-compliant canned replies
//! - Guard rules validating or overriding model-generated replies
//! - Local lead completeness scoring with AI-score precedence
//! - Required-field resolution and the clarification flow
//! - Chat and lead-intake orchestration over the store/mail/model seams

pub mod canned;
pub mod chat;
pub mod guard;
pub mod intake;
pub mod intent;
pub mod qualify;
pub mod scoring;

pub use canned::CannedResponder;
pub use chat::SalesAgent;
pub use guard::ReplyGuard;
pub use intake::{ClarifyOutcome, IntakeOutcome, LeadIntake};
pub use intent::{IntentClassifier, ReplyIntent};
pub use qualify::{needs_clarification, MissingFields, RequiredFieldResolver};
pub use scoring::{local_quality_score, resolve_score};

use thiserror::Error;
use uuid::Uuid;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Lead not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<lead_desk_persistence::PersistenceError> for AgentError {
    fn from(err: lead_desk_persistence::PersistenceError) -> Self {
        AgentError::Storage(err.to_string())
    }
}
