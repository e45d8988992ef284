//! Driving port for invoice mutations.
//!
//! Member operations only act on the caller's own invoices; admin operations
//! assume the inbound adapter has already checked the admin role.

use async_trait::async_trait;

use crate::domain::{Error, Invoice, InvoiceId, MemberId, PaymentCurrency};

/// Request to open a new invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateInvoiceRequest {
    /// Currency the member will pay in.
    pub currency: PaymentCurrency,
    /// Amount in the currency's minor unit.
    pub amount: i64,
}

/// Driving port for invoice write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceCommand: Send + Sync {
    /// Price and issue an invoice for `member`.
    async fn create_invoice(
        &self,
        member: &MemberId,
        request: CreateInvoiceRequest,
    ) -> Result<Invoice, Error>;

    /// Attach payment proof to one of the member's unpaid invoices.
    async fn submit_proof(
        &self,
        member: &MemberId,
        invoice: &InvoiceId,
        proof_url: String,
    ) -> Result<Invoice, Error>;

    /// Cancel one of the member's unpaid invoices.
    async fn cancel_invoice(&self, member: &MemberId, invoice: &InvoiceId)
    -> Result<Invoice, Error>;

    /// Confirm payment for an invoice under review.
    async fn admin_approve(&self, admin: &MemberId, invoice: &InvoiceId) -> Result<Invoice, Error>;

    /// Reject the proof of an invoice under review.
    async fn admin_reject(&self, admin: &MemberId, invoice: &InvoiceId) -> Result<Invoice, Error>;

    /// Cancel any member's unpaid invoice.
    async fn admin_cancel(&self, admin: &MemberId, invoice: &InvoiceId) -> Result<Invoice, Error>;
}
