//! Driving port for on-demand transactional email.

use async_trait::async_trait;

use crate::domain::{Error, InvoiceEmailKind, InvoiceId};

/// Driving port behind the email function endpoints.
///
/// Unlike the best-effort sends inside other services, these calls report
/// provider failures to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationCommand: Send + Sync {
    /// Render and send an invoice email to the invoice's owner.
    async fn send_invoice_email(&self, invoice: &InvoiceId, kind: InvoiceEmailKind)
    -> Result<(), Error>;

    /// Send a free-form notice to the admin mailbox.
    async fn notify_admin(&self, subject: &str, message: &str) -> Result<(), Error>;
}
