//! Email delivery for domain services and the email function endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::notification::{self, EmailMessage, InvoiceEmailKind};
use super::port_error_mapping::{
    map_email_sender_error, map_invoice_repository_error, map_profile_repository_error,
};
use super::ports::{
    EmailSender, EmailSenderError, InvoiceRepository, NotificationCommand, ProfileRepository,
};
use super::{EmailAddress, Error, InvoiceId};

/// Email sender plus the admin mailbox.
#[derive(Clone)]
pub struct Mailer {
    sender: Arc<dyn EmailSender>,
    admin: EmailAddress,
}

impl Mailer {
    /// Wrap a sender; `admin` receives operator notifications.
    pub fn new(sender: Arc<dyn EmailSender>, admin: EmailAddress) -> Self {
        Self { sender, admin }
    }

    /// Admin mailbox.
    pub fn admin(&self) -> &EmailAddress {
        &self.admin
    }

    /// Send and report failures to the caller.
    pub async fn send(&self, message: &EmailMessage) -> Result<(), EmailSenderError> {
        self.sender.send(message).await
    }

    /// Send without failing the surrounding operation.
    ///
    /// Returns whether the provider accepted the message. Failures are logged
    /// at warn level and never retried.
    pub async fn send_best_effort(&self, message: &EmailMessage, purpose: &'static str) -> bool {
        match self.sender.send(message).await {
            Ok(()) => {
                debug!(purpose, subject = %message.subject, "email sent");
                true
            }
            Err(error) => {
                warn!(purpose, subject = %message.subject, %error, "email send failed");
                false
            }
        }
    }
}

/// Service behind the email function endpoints.
#[derive(Clone)]
pub struct NotificationService<I, P> {
    invoices: Arc<I>,
    profiles: Arc<P>,
    mailer: Mailer,
}

impl<I, P> NotificationService<I, P> {
    /// Create the service.
    pub fn new(invoices: Arc<I>, profiles: Arc<P>, mailer: Mailer) -> Self {
        Self {
            invoices,
            profiles,
            mailer,
        }
    }
}

#[async_trait]
impl<I, P> NotificationCommand for NotificationService<I, P>
where
    I: InvoiceRepository,
    P: ProfileRepository,
{
    async fn send_invoice_email(
        &self,
        invoice_id: &InvoiceId,
        kind: InvoiceEmailKind,
    ) -> Result<(), Error> {
        let invoice = self
            .invoices
            .find_by_id(invoice_id)
            .await
            .map_err(map_invoice_repository_error)?
            .ok_or_else(|| Error::not_found(format!("invoice {invoice_id} not found")))?;
        let profile = self
            .profiles
            .find_by_id(&invoice.member_id)
            .await
            .map_err(map_profile_repository_error)?
            .ok_or_else(|| Error::not_found("invoice owner not found"))?;

        let message = match kind {
            InvoiceEmailKind::Created => notification::invoice_created(&profile, &invoice),
            InvoiceEmailKind::Expired => notification::invoice_expired(&profile, &invoice),
            InvoiceEmailKind::Paid => notification::invoice_paid(&profile, &invoice),
        };
        self.mailer
            .send(&message)
            .await
            .map_err(map_email_sender_error)
    }

    async fn notify_admin(&self, subject: &str, message: &str) -> Result<(), Error> {
        if subject.trim().is_empty() || message.trim().is_empty() {
            return Err(Error::invalid_request("subject and message are required"));
        }
        let email = notification::admin_notice(self.mailer.admin(), subject, message);
        self.mailer
            .send(&email)
            .await
            .map_err(map_email_sender_error)
    }
}
