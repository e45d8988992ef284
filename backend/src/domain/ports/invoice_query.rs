//! Driving port for invoice reads.

use async_trait::async_trait;

use crate::domain::{Error, Invoice, InvoiceId, InvoiceStatus, MemberId};

/// Driving port for invoice read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceQuery: Send + Sync {
    /// The member's invoices, newest first.
    async fn list_member_invoices(&self, member: &MemberId) -> Result<Vec<Invoice>, Error>;

    /// One of the member's invoices; other members' invoices are not found.
    async fn get_invoice(&self, member: &MemberId, invoice: &InvoiceId) -> Result<Invoice, Error>;

    /// Every invoice, newest first, optionally filtered by status.
    async fn admin_list_invoices(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, Error>;
}
