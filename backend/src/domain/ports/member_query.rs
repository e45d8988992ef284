//! Driving port for member profile and dashboard reads.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, MemberId, Profile, ReferralSummary};

/// Invoice counts per status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCounts {
    /// `UNPAID` invoices.
    pub unpaid: u64,
    /// `PENDING_REVIEW` invoices.
    pub pending_review: u64,
    /// `PAID` invoices.
    pub paid: u64,
    /// `CANCELLED` invoices.
    pub cancelled: u64,
    /// `EXPIRED` invoices.
    pub expired: u64,
}

/// Figures shown on the member dashboard.
///
/// When the underlying reads fail the service returns
/// `DashboardSummary::default()` rather than an error.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Invoice counts per status.
    pub invoices: InvoiceCounts,
    /// Tokens from paid invoices.
    pub tpc_paid: i64,
    /// Tokens from invoices awaiting review.
    pub tpc_pending: i64,
    /// Direct referrals.
    pub referral_count: u64,
}

/// Driving port for member read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberQuery: Send + Sync {
    /// Load the member's profile.
    async fn get_profile(&self, member: &MemberId) -> Result<Profile, Error>;

    /// Members the caller referred directly, newest first.
    async fn list_referrals(&self, member: &MemberId) -> Result<Vec<ReferralSummary>, Error>;

    /// Dashboard figures; never fails on data-access errors.
    async fn dashboard_summary(&self, member: &MemberId) -> Result<DashboardSummary, Error>;
}
