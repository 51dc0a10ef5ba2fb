//! Core types for the lead-desk backend
//!
//! This crate provides foundational types used across all other crates:
//! - Lead submissions, service types and legacy mode codes
//! - The closed field-value model with the single emptiness predicate
//! - Chat transcript turns
//! - The structured AI brief result
//! - Error types

pub mod brief;
pub mod chat;
pub mod error;
pub mod field;
pub mod lead;

pub use brief::{AiBrief, Estimate, PlanSection, ScoreValue};
pub use chat::{normalize_session_id, ChatTurn, UNKNOWN_SESSION};
pub use error::{Error, Result};
pub use field::{FieldValue, LeadFields};
pub use lead::{
    AiOutcome, AiStatus, Clarifications, EmailStatus, LeadStatus, LeadSubmission, QualityScore,
    ScoreSource, ServiceType,
};
