//! Port for invoice persistence.
//!
//! Status changes go through [`InvoiceRepository::update_status`], a
//! compare-and-set on the previous status, so two admins (or an admin and the
//! expiry sweep) racing on the same invoice cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Invoice, InvoiceId, InvoiceStatus, MemberId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by invoice repository adapters.
    pub enum InvoiceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "invoice repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "invoice repository query failed: {message}",
        /// Another invoice already uses this number.
        DuplicateNumber { number: String } =>
            "invoice number {number} already exists",
    }
}

/// Port for reading and writing invoices.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Persist a newly issued invoice.
    async fn insert(&self, invoice: &Invoice) -> Result<(), InvoiceRepositoryError>;

    /// Find an invoice by id.
    async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, InvoiceRepositoryError>;

    /// List a member's invoices, newest first.
    async fn list_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError>;

    /// List all invoices, newest first, optionally filtered by status.
    async fn list(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError>;

    /// Write `invoice`'s status and review fields if the stored row is still
    /// in `expected`.
    ///
    /// Returns `false` when the row was missing or had already moved on.
    async fn update_status(
        &self,
        invoice: &Invoice,
        expected: InvoiceStatus,
    ) -> Result<bool, InvoiceRepositoryError>;

    /// Atomically move every `UNPAID` invoice with `expires_at < now` to
    /// `EXPIRED` and return the rows this call transitioned.
    async fn expire_unpaid_before(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError>;
}

/// Fixture implementation for tests that do not exercise invoice storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInvoiceRepository;

#[async_trait]
impl InvoiceRepository for FixtureInvoiceRepository {
    async fn insert(&self, _invoice: &Invoice) -> Result<(), InvoiceRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &InvoiceId) -> Result<Option<Invoice>, InvoiceRepositoryError> {
        Ok(None)
    }

    async fn list_for_member(
        &self,
        _member_id: &MemberId,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
        Ok(Vec::new())
    }

    async fn list(
        &self,
        _status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
        Ok(Vec::new())
    }

    async fn update_status(
        &self,
        _invoice: &Invoice,
        _expected: InvoiceStatus,
    ) -> Result<bool, InvoiceRepositoryError> {
        Ok(false)
    }

    async fn expire_unpaid_before(
        &self,
        _now: DateTime<Utc>,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_sweep_expires_nothing() {
        let repo = FixtureInvoiceRepository;
        let expired = repo
            .expire_unpaid_before(Utc::now())
            .await
            .expect("fixture sweep succeeds");
        assert!(expired.is_empty());
    }

    #[rstest]
    fn duplicate_number_formats_message() {
        let err = InvoiceRepositoryError::duplicate_number("TPC-20260101-AAAAAA");
        assert_eq!(
            err.to_string(),
            "invoice number TPC-20260101-AAAAAA already exists"
        );
    }
}
