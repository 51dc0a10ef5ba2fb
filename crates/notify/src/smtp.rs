//! SMTP mailer

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use lead_desk_config::SmtpSettings;

use crate::{Mailer, NotifyError};

/// Mailer delivering over an SMTP STARTTLS relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    /// Build from settings. Returns `None` when credentials are incomplete,
    /// so the caller can fall back to the skipped outcome.
    pub fn from_settings(settings: &SmtpSettings) -> Result<Option<Self>, NotifyError> {
        if !settings.is_configured() {
            return Ok(None);
        }

        // is_configured() guarantees these are present
        let host = settings.host.as_deref().unwrap_or_default();
        let username = settings.username.clone().unwrap_or_default();
        let password = settings.password.clone().unwrap_or_default();
        let to_email = settings.to_email.as_deref().unwrap_or_default();
        let sender = settings.sender().unwrap_or_default();

        let from: Mailbox = sender
            .parse()
            .map_err(|e| NotifyError::InvalidAddress(format!("sender '{}': {}", sender, e)))?;
        let to: Mailbox = to_email
            .parse()
            .map_err(|e| NotifyError::InvalidAddress(format!("recipient '{}': {}", to_email, e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| NotifyError::Transport(format!("relay '{}': {}", host, e)))?
            .port(settings.port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Some(Self {
            transport,
            from,
            to,
        }))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        tracing::info!(to = %self.to, "Lead notification email sent");
        Ok(())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_settings_yield_none() {
        let mut settings = SmtpSettings::default();
        assert!(SmtpMailer::from_settings(&settings).unwrap().is_none());

        settings.host = Some("smtp.example.com".to_string());
        settings.username = Some("ops@example.com".to_string());
        // password and to_email still missing
        assert!(SmtpMailer::from_settings(&settings).unwrap().is_none());
    }

    #[test]
    fn test_complete_settings_build_a_mailer() {
        let settings = SmtpSettings {
            host: Some("smtp.example.com".to_string()),
            port: 587,
            username: Some("ops@example.com".to_string()),
            password: Some("secret".to_string()),
            to_email: Some("owner@example.com".to_string()),
            from_email: None,
        };
        let mailer = SmtpMailer::from_settings(&settings).unwrap().unwrap();
        assert!(mailer.is_configured());
    }

    #[test]
    fn test_invalid_recipient_is_rejected() {
        let settings = SmtpSettings {
            host: Some("smtp.example.com".to_string()),
            port: 587,
            username: Some("ops@example.com".to_string()),
            password: Some("secret".to_string()),
            to_email: Some("not-an-address".to_string()),
            from_email: None,
        };
        let err = SmtpMailer::from_settings(&settings).err().unwrap();
        assert!(matches!(err, NotifyError::InvalidAddress(_)));
    }
}
