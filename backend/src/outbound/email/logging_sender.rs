//! Email sender that only logs.

use async_trait::async_trait;
use tracing::info;

use crate::domain::EmailMessage;
use crate::domain::ports::{EmailSender, EmailSenderError};

/// Accepts every message and records its envelope at `info` level.
///
/// Bodies are never logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSenderError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "email provider not configured; message logged only"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmailAddress;

    #[tokio::test]
    async fn logging_sender_accepts_messages() {
        let message = EmailMessage {
            to: EmailAddress::new("member@example.com").expect("valid email"),
            subject: "Invoice".to_owned(),
            html: "<p>hi</p>".to_owned(),
            text: "hi".to_owned(),
        };
        assert!(LoggingEmailSender.send(&message).await.is_ok());
    }
}
