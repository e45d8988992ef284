//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Enum columns travel as their storage
//! strings; the repositories parse them back into domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{invoices, profiles, withdrawals};

/// Row struct for reading from the profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub member_code: String,
    pub referral_code: String,
    pub sponsor_id: Option<Uuid>,
    pub role: String,
    pub language: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating profiles.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub full_name: &'a str,
    pub member_code: &'a str,
    pub referral_code: &'a str,
    pub sponsor_id: Option<Uuid>,
    pub role: &'a str,
    pub language: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Projection used by the referral listing.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReferralRow {
    pub id: Uuid,
    pub full_name: String,
    pub member_code: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Invoice models
// ---------------------------------------------------------------------------

/// Row struct for reading from the invoices table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InvoiceRow {
    pub id: Uuid,
    pub number: String,
    pub member_id: Uuid,
    pub currency: String,
    pub amount_input: i64,
    pub tpc_amount: i64,
    pub status: String,
    pub proof_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
}

/// Insertable struct for issuing invoices.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoices)]
pub(crate) struct NewInvoiceRow<'a> {
    pub id: Uuid,
    pub number: &'a str,
    pub member_id: Uuid,
    pub currency: &'a str,
    pub amount_input: i64,
    pub tpc_amount: i64,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Changeset written by status transitions.
///
/// `None` clears the column so a reverted field never lingers.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = invoices)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct InvoiceStatusUpdate<'a> {
    pub status: &'a str,
    pub proof_url: Option<&'a str>,
    pub paid_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Withdrawal models
// ---------------------------------------------------------------------------

/// Row struct for reading from the withdrawals table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = withdrawals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WithdrawalRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub tpc_amount: i64,
    pub wallet_address: String,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Insertable struct for withdrawal requests.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = withdrawals)]
pub(crate) struct NewWithdrawalRow<'a> {
    pub id: Uuid,
    pub member_id: Uuid,
    pub tpc_amount: i64,
    pub wallet_address: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Changeset recording an admin review.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = withdrawals)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct WithdrawalReviewUpdate<'a> {
    pub status: &'a str,
    pub note: Option<&'a str>,
    pub reviewed_at: Option<DateTime<Utc>>,
}
