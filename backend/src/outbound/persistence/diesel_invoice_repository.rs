//! PostgreSQL-backed `InvoiceRepository` implementation using Diesel ORM.
//!
//! Status writes filter on the expected previous status, and the expiry
//! sweep is a single `UPDATE … RETURNING`, so concurrent callers never both
//! observe the same transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::error;

use crate::domain::ports::{InvoiceRepository, InvoiceRepositoryError};
use crate::domain::{
    Invoice, InvoiceId, InvoiceNumber, InvoiceStatus, MemberId, PaymentCurrency,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::models::{InvoiceRow, InvoiceStatusUpdate, NewInvoiceRow};
use super::pool::{DbPool, PoolError};
use super::schema::invoices;

/// Diesel-backed implementation of the `InvoiceRepository` port.
#[derive(Clone)]
pub struct DieselInvoiceRepository {
    pool: DbPool,
}

impl DieselInvoiceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> InvoiceRepositoryError {
    map_basic_pool_error(error, InvoiceRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> InvoiceRepositoryError {
    map_basic_diesel_error(
        error,
        InvoiceRepositoryError::query,
        InvoiceRepositoryError::connection,
    )
}

fn corrupt(column: &str, id: uuid::Uuid, error: impl std::fmt::Display) -> InvoiceRepositoryError {
    InvoiceRepositoryError::query(format!("invoice {id} has invalid {column}: {error}"))
}

/// Convert a database row to a domain invoice.
fn row_to_invoice(row: InvoiceRow) -> Result<Invoice, InvoiceRepositoryError> {
    let id = row.id;
    Ok(Invoice {
        id: InvoiceId::from_uuid(id),
        number: InvoiceNumber::new(&row.number).map_err(|err| corrupt("number", id, err))?,
        member_id: MemberId::from_uuid(row.member_id),
        currency: row
            .currency
            .parse::<PaymentCurrency>()
            .map_err(|err| corrupt("currency", id, err))?,
        amount_input: row.amount_input,
        tpc_amount: row.tpc_amount,
        status: row
            .status
            .parse::<InvoiceStatus>()
            .map_err(|err| corrupt("status", id, err))?,
        proof_url: row.proof_url,
        created_at: row.created_at,
        expires_at: row.expires_at,
        paid_at: row.paid_at,
        reviewed_by: row.reviewed_by.map(MemberId::from_uuid),
    })
}

fn rows_to_invoices(rows: Vec<InvoiceRow>) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
    rows.into_iter().map(row_to_invoice).collect()
}

#[async_trait]
impl InvoiceRepository for DieselInvoiceRepository {
    async fn insert(&self, invoice: &Invoice) -> Result<(), InvoiceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewInvoiceRow {
            id: *invoice.id.as_uuid(),
            number: invoice.number.as_ref(),
            member_id: *invoice.member_id.as_uuid(),
            currency: invoice.currency.as_str(),
            amount_input: invoice.amount_input,
            tpc_amount: invoice.tpc_amount,
            status: invoice.status.as_str(),
            created_at: invoice.created_at,
            expires_at: invoice.expires_at,
        };
        diesel::insert_into(invoices::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if unique_violation_constraint(&err).is_some() {
                    InvoiceRepositoryError::duplicate_number(invoice.number.to_string())
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, InvoiceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<InvoiceRow> = invoices::table
            .filter(invoices::id.eq(id.as_uuid()))
            .select(InvoiceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_invoice).transpose()
    }

    async fn list_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<InvoiceRow> = invoices::table
            .filter(invoices::member_id.eq(member_id.as_uuid()))
            .order((invoices::created_at.desc(), invoices::id.desc()))
            .select(InvoiceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_invoices(rows)
    }

    async fn list(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = invoices::table
            .select(InvoiceRow::as_select())
            .order((invoices::created_at.desc(), invoices::id.desc()))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(invoices::status.eq(status.as_str()));
        }
        let rows: Vec<InvoiceRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows_to_invoices(rows)
    }

    async fn update_status(
        &self,
        invoice: &Invoice,
        expected: InvoiceStatus,
    ) -> Result<bool, InvoiceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = InvoiceStatusUpdate {
            status: invoice.status.as_str(),
            proof_url: invoice.proof_url.as_deref(),
            paid_at: invoice.paid_at,
            reviewed_by: invoice.reviewed_by.map(|admin| *admin.as_uuid()),
        };
        let updated = diesel::update(
            invoices::table.filter(
                invoices::id
                    .eq(invoice.id.as_uuid())
                    .and(invoices::status.eq(expected.as_str())),
            ),
        )
        .set(&update)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn expire_unpaid_before(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<InvoiceRow> = diesel::update(
            invoices::table.filter(
                invoices::status
                    .eq(InvoiceStatus::Unpaid.as_str())
                    .and(invoices::expires_at.lt(now)),
            ),
        )
        .set(invoices::status.eq(InvoiceStatus::Expired.as_str()))
        .returning(InvoiceRow::as_returning())
        .get_results(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(readable_expired_invoices(rows))
    }
}

/// Convert rows the sweep has already expired.
///
/// The update is committed by now, so an unreadable row must not cost the
/// other owners their notification. Such rows are logged and skipped.
fn readable_expired_invoices(rows: Vec<InvoiceRow>) -> Vec<Invoice> {
    let total = rows.len();
    let invoices: Vec<Invoice> = rows
        .into_iter()
        .filter_map(|row| {
            let id = row.id;
            row_to_invoice(row)
                .map_err(|err| {
                    error!(invoice_id = %id, error = %err, "expired invoice row unreadable");
                })
                .ok()
        })
        .collect();
    let skipped = total - invoices.len();
    if skipped > 0 {
        error!(skipped, total, "expired invoices left without notification");
    }
    invoices
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; query behaviour needs a live database.

    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    #[fixture]
    fn row() -> InvoiceRow {
        let created_at = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        InvoiceRow {
            id: Uuid::nil(),
            number: "TPC-20260301-7K2M9Q".to_owned(),
            member_id: Uuid::nil(),
            currency: "IDR".to_owned(),
            amount_input: 1_700_000,
            tpc_amount: 10_000,
            status: "PENDING_REVIEW".to_owned(),
            proof_url: Some("https://files.example.com/proof.png".to_owned()),
            created_at,
            expires_at: created_at + Duration::hours(24),
            paid_at: None,
            reviewed_by: None,
        }
    }

    #[rstest]
    fn converts_a_stored_invoice(row: InvoiceRow) {
        let invoice = row_to_invoice(row).expect("valid row");
        assert_eq!(invoice.status, InvoiceStatus::PendingReview);
        assert_eq!(invoice.currency, PaymentCurrency::Idr);
        assert_eq!(invoice.number.as_ref(), "TPC-20260301-7K2M9Q");
    }

    #[rstest]
    #[case("status", "LOST")]
    #[case("currency", "EUR")]
    #[case("number", "INV-1")]
    fn corrupt_columns_are_named(mut row: InvoiceRow, #[case] column: &str, #[case] value: &str) {
        match column {
            "status" => row.status = value.to_owned(),
            "currency" => row.currency = value.to_owned(),
            _ => row.number = value.to_owned(),
        }
        let err = row_to_invoice(row).expect_err("corrupt row");
        assert!(err.to_string().contains(&format!("invalid {column}")), "{err}");
    }

    #[rstest]
    fn unreadable_expired_rows_do_not_hide_the_rest(row: InvoiceRow) {
        let mut first = row.clone();
        first.id = Uuid::new_v4();
        first.status = "EXPIRED".to_owned();
        let mut broken = row.clone();
        broken.id = Uuid::new_v4();
        broken.currency = "EUR".to_owned();
        let mut last = row;
        last.id = Uuid::new_v4();
        last.status = "EXPIRED".to_owned();
        let expected = vec![first.id, last.id];

        let invoices = readable_expired_invoices(vec![first, broken, last]);

        let ids: Vec<Uuid> = invoices.iter().map(|invoice| *invoice.id.as_uuid()).collect();
        assert_eq!(ids, expected);
        assert!(invoices.iter().all(|invoice| invoice.status == InvoiceStatus::Expired));
    }
}
