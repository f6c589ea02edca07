use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

use crate::config::SmtpSettings;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Send error: {0}")]
    SendFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &EmailMessage) -> Result<(), MailerError>;
}

pub struct SmtpMailer {
    settings: SmtpSettings,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Result<Self, MailerError> {
        let creds = Credentials::new(settings.user.clone(), settings.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| {
                MailerError::Configuration(format!("Failed to create SMTP relay: {}", e))
            })?
            .port(settings.port)
            .credentials(creds)
            .build();

        Ok(Self {
            settings,
            transport,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &EmailMessage) -> Result<(), MailerError> {
        let from_mailbox: Mailbox = format!(
            "{} <{}>",
            self.settings.from_name, self.settings.from_email
        )
        .parse()
        .map_err(|e| MailerError::Configuration(format!("Invalid from address: {}", e)))?;

        let to_mailbox: Mailbox = email
            .to
            .parse()
            .map_err(|e| MailerError::InvalidRecipient(format!("Invalid recipient: {}", e)))?;

        let message = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.body_html.clone())
            .map_err(|e| MailerError::SendFailed(format!("Failed to build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::SendFailed(format!("Failed to send email: {}", e)))?;

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully"
        );

        Ok(())
    }
}

/// Records outbound mail instead of sending it; used when SMTP is disabled
/// and by the integration tests.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<EmailMessage>>,
    send_count: AtomicU64,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mock mailer lock poisoned").clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: &EmailMessage) -> Result<(), MailerError> {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .expect("mock mailer lock poisoned")
            .push(email.clone());

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "[MOCK] Email would be sent"
        );

        Ok(())
    }
}
