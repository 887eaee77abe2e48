//! Email service for relaying contact and donation messages
//!
//! Form submissions are not stored; they are forwarded to the configured
//! recipient over SMTP. An empty `smtp_host` disables delivery, which
//! surfaces as a configuration error to the caller.

use anyhow::anyhow;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Deserialize;

use super::{ServiceError, ServiceResult};
use crate::config::EmailConfig;

/// A contact form submission
#[derive(Debug, Clone, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

/// A donation inquiry submission
#[derive(Debug, Clone, Deserialize)]
pub struct DonationInquiry {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    pub message: String,
}

/// Email relay service
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Forward a contact form message to the configured recipient.
    pub async fn send_contact(&self, message: &ContactMessage) -> ServiceResult<()> {
        validate_sender(&message.name, &message.email)?;
        if message.message.trim().is_empty() {
            return Err(ServiceError::validation("Message is required"));
        }

        let subject = format!("[Contact] {}", message.subject.trim());
        let body = format!(
            "From: {} <{}>\nPhone: {}\n\n{}",
            message.name,
            message.email,
            message.phone.as_deref().unwrap_or("-"),
            message.message
        );
        self.relay(&subject, &body, &message.email).await
    }

    /// Forward a donation inquiry to the configured recipient.
    pub async fn send_donation_inquiry(&self, inquiry: &DonationInquiry) -> ServiceResult<()> {
        validate_sender(&inquiry.name, &inquiry.email)?;
        if inquiry.message.trim().is_empty() {
            return Err(ServiceError::validation("Message is required"));
        }

        let subject = format!("[Donation] Inquiry from {}", inquiry.name.trim());
        let body = format!(
            "From: {} <{}>\nPhone: {}\nIntended amount: {}\n\n{}",
            inquiry.name,
            inquiry.email,
            inquiry.phone.as_deref().unwrap_or("-"),
            inquiry.amount.as_deref().unwrap_or("-"),
            inquiry.message
        );
        self.relay(&subject, &body, &inquiry.email).await
    }

    async fn relay(&self, subject: &str, body: &str, reply_to: &str) -> ServiceResult<()> {
        if self.config.smtp_host.is_empty() {
            return Err(ServiceError::Internal(anyhow!(
                "SMTP host not configured; cannot relay messages"
            )));
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_address);
        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| anyhow!("Invalid from address: {}", e))?,
            )
            .reply_to(
                reply_to
                    .parse()
                    .map_err(|_| ServiceError::validation("Invalid email address"))?,
            )
            .to(self
                .config
                .recipient
                .parse()
                .map_err(|e| anyhow!("Invalid recipient address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );
        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
                .credentials(creds)
                .port(self.config.smtp_port)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        tracing::info!(subject, "relayed form submission");
        Ok(())
    }
}

fn validate_sender(name: &str, email: &str) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::validation("Name is required"));
    }
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ServiceError::validation("Invalid email address"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> EmailService {
        EmailService::new(EmailConfig::default())
    }

    fn contact() -> ContactMessage {
        ContactMessage {
            name: "Amina".to_string(),
            email: "amina@example.org".to_string(),
            phone: None,
            subject: "Volunteering".to_string(),
            message: "How can I help?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_invalid_sender_rejected_before_transport() {
        let service = unconfigured();
        let mut bad = contact();
        bad.email = "not-an-email".to_string();
        assert!(matches!(
            service.send_contact(&bad).await,
            Err(ServiceError::Validation(_))
        ));

        let mut bad = contact();
        bad.message = "  ".to_string();
        assert!(matches!(
            service.send_contact(&bad).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_smtp_host_is_internal_error() {
        let service = unconfigured();
        assert!(matches!(
            service.send_contact(&contact()).await,
            Err(ServiceError::Internal(_))
        ));
    }
}
