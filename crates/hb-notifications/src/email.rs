//! Email delivery
//!
//! Delivery itself is an external concern. `EmailSender` is the seam; the two senders here
//! log messages or keep them in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Email errors
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("No recipients")]
    NoRecipients,
}

pub type EmailResult<T> = Result<T, EmailError>;

/// Email message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Message ID
    pub id: String,
    pub from: EmailAddress,
    pub to: Vec<EmailAddress>,
    pub subject: String,
    /// Plain text body
    pub text_body: String,
    pub html_body: Option<String>,
    /// Custom headers
    pub headers: Vec<(String, String)>,
    pub created_at: DateTime<Utc>,
}

/// Email address with optional name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
    pub name: Option<String>,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Format as RFC 5322
    pub fn to_rfc5322(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

impl EmailMessage {
    pub fn new(
        from: EmailAddress,
        to: Vec<EmailAddress>,
        subject: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from,
            to,
            subject: subject.into(),
            text_body: text_body.into(),
            html_body: None,
            headers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Comma-separated recipient list
    pub fn recipients(&self) -> String {
        self.to
            .iter()
            .map(EmailAddress::to_rfc5322)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Email sender trait
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email, returning its message id
    async fn send(&self, message: &EmailMessage) -> EmailResult<String>;

    fn is_configured(&self) -> bool;
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Default)]
pub struct ConsoleEmailSender;

impl ConsoleEmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for ConsoleEmailSender {
    async fn send(&self, message: &EmailMessage) -> EmailResult<String> {
        if message.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        tracing::info!(
            id = %message.id,
            from = %message.from.to_rfc5322(),
            to = %message.recipients(),
            subject = %message.subject,
            "Email sent"
        );
        tracing::debug!(body = %message.text_body, "Email body");

        Ok(message.id.clone())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Keeps every sent message; used by tests
#[derive(Debug, Default)]
pub struct MemoryEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl MemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl EmailSender for MemoryEmailSender {
    async fn send(&self, message: &EmailMessage) -> EmailResult<String> {
        if message.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        self.sent.lock().push(message.clone());
        Ok(message.id.clone())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_address_format() {
        let addr = EmailAddress::new("test@example.com").with_name("Test User");
        assert_eq!(addr.to_rfc5322(), "Test User <test@example.com>");

        let addr2 = EmailAddress::new("no-name@example.com");
        assert_eq!(addr2.to_rfc5322(), "no-name@example.com");
    }

    #[test]
    fn test_email_message_creation() {
        let from = EmailAddress::new("hourbook@example.com").with_name("Hourbook");
        let to = vec![
            EmailAddress::new("a@example.com"),
            EmailAddress::new("b@example.com").with_name("B"),
        ];

        let message = EmailMessage::new(from, to, "Subject", "Body")
            .with_html("<p>Body</p>")
            .header("X-Hourbook-Project", "1");

        assert!(message.html_body.is_some());
        assert_eq!(message.headers.len(), 1);
        assert_eq!(message.recipients(), "a@example.com, B <b@example.com>");
    }

    #[tokio::test]
    async fn test_console_sender() {
        let sender = ConsoleEmailSender::new();
        let message = EmailMessage::new(
            EmailAddress::new("test@example.com"),
            vec![EmailAddress::new("user@example.com")],
            "Test",
            "Test body",
        );
        assert_eq!(sender.send(&message).await.unwrap(), message.id);
    }

    #[tokio::test]
    async fn test_memory_sender() {
        let sender = MemoryEmailSender::new();
        let empty = EmailMessage::new(EmailAddress::new("test@example.com"), vec![], "Test", "");
        assert!(matches!(sender.send(&empty).await, Err(EmailError::NoRecipients)));

        let message = EmailMessage::new(
            EmailAddress::new("test@example.com"),
            vec![EmailAddress::new("user@example.com")],
            "Test",
            "Test body",
        );
        sender.send(&message).await.unwrap();
        assert_eq!(sender.sent().len(), 1);
        assert_eq!(sender.sent()[0].subject, "Test");
    }
}
