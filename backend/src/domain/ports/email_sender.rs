//! Port abstraction for the transactional email provider.

use async_trait::async_trait;

use crate::domain::EmailMessage;

use super::define_port_error;

define_port_error! {
    /// Errors raised while handing an email to the provider.
    pub enum EmailSenderError {
        /// Provider throttled the request.
        RateLimited { message: String } =>
            "email provider rate limited the request: {message}",
        /// Provider refused the message (bad recipient, unverified sender).
        Rejected { message: String } =>
            "email provider rejected the message: {message}",
        /// Provider did not answer in time.
        Timeout { message: String } =>
            "email provider timed out: {message}",
        /// Network failure or provider-side error.
        Transport { message: String } =>
            "email provider transport failed: {message}",
    }
}

/// Port for sending one rendered email.
///
/// Callers treat every send as best-effort; nothing retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver `message` to the provider.
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSenderError>;
}

/// Fixture sender that accepts and drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEmailSender;

#[async_trait]
impl EmailSender for FixtureEmailSender {
    async fn send(&self, _message: &EmailMessage) -> Result<(), EmailSenderError> {
        Ok(())
    }
}
