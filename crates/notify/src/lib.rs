//! Operator email notifications
//!
//! One notification per stored lead, sent over SMTP in a single attempt.
//! Missing credentials degrade to the `skipped` outcome instead of failing
//! the request; a transport failure is reported as `failed:<reason>` and
//! never retried.

pub mod message;
pub mod smtp;

pub use message::{lead_body, lead_subject};
pub use smtp::SmtpMailer;

use async_trait::async_trait;
use thiserror::Error;

/// Notification errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Email channel is not configured")]
    NotConfigured,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Message build failed: {0}")]
    Message(String),

    #[error("SMTP send failed: {0}")]
    Transport(String),
}

impl From<NotifyError> for lead_desk_core::Error {
    fn from(err: NotifyError) -> Self {
        lead_desk_core::Error::Notify(err.to_string())
    }
}

/// Email delivery seam.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message to the operator. Exactly one attempt, no retry.
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;

    /// False when credentials are absent and delivery should be skipped.
    fn is_configured(&self) -> bool;
}

/// Mailer used when no SMTP credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }

    fn is_configured(&self) -> bool {
        false
    }
}
