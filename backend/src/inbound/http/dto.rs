//! Response payloads shared by member and admin handlers.
//!
//! Identifiers and timestamps are rendered as strings so the wire format does
//! not follow the domain types' serde derives.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{DashboardSummary, InvoiceCounts};
use crate::domain::{
    Invoice, InvoiceStatus, Language, MemberRole, PaymentCurrency, Profile, ReferralSummary,
    Withdrawal, WithdrawalStatus,
};
use crate::inbound::http::schemas::{
    InvoiceStatusSchema, LanguageSchema, MemberRoleSchema, PaymentCurrencySchema,
    WithdrawalStatusSchema,
};

/// Signed-in member's profile. The password hash never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(example = "budi@example.com")]
    pub email: String,
    pub full_name: String,
    #[schema(example = "TPC000101")]
    pub member_code: String,
    #[schema(example = "BUDI2345")]
    pub referral_code: String,
    #[schema(format = "uuid")]
    pub sponsor_id: Option<String>,
    #[schema(value_type = MemberRoleSchema)]
    pub role: MemberRole,
    #[schema(value_type = LanguageSchema)]
    pub language: Language,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            email: profile.email.to_string(),
            full_name: profile.full_name.as_ref().to_owned(),
            member_code: profile.member_code.to_string(),
            referral_code: profile.referral_code.to_string(),
            sponsor_id: profile.sponsor_id.map(|id| id.to_string()),
            role: profile.role,
            language: profile.language,
            created_at: profile.created_at.to_rfc3339(),
        }
    }
}

/// Direct referral of the signed-in member.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralResponse {
    #[schema(format = "uuid")]
    pub member_id: String,
    pub full_name: String,
    pub member_code: String,
    #[schema(format = "date-time")]
    pub joined_at: String,
}

impl From<ReferralSummary> for ReferralResponse {
    fn from(referral: ReferralSummary) -> Self {
        Self {
            member_id: referral.member_id.to_string(),
            full_name: referral.full_name,
            member_code: referral.member_code,
            joined_at: referral.joined_at.to_rfc3339(),
        }
    }
}

/// Invoice counts keyed by status.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCountsResponse {
    pub unpaid: u64,
    pub pending_review: u64,
    pub paid: u64,
    pub cancelled: u64,
    pub expired: u64,
}

impl From<InvoiceCounts> for InvoiceCountsResponse {
    fn from(counts: InvoiceCounts) -> Self {
        Self {
            unpaid: counts.unpaid,
            pending_review: counts.pending_review,
            paid: counts.paid,
            cancelled: counts.cancelled,
            expired: counts.expired,
        }
    }
}

/// Dashboard tiles for the member area.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub invoices: InvoiceCountsResponse,
    /// TPC bought through paid invoices.
    pub tpc_paid: i64,
    /// TPC on invoices awaiting payment or review.
    pub tpc_pending: i64,
    pub referral_count: u64,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            invoices: summary.invoices.into(),
            tpc_paid: summary.tpc_paid,
            tpc_pending: summary.tpc_pending,
            referral_count: summary.referral_count,
        }
    }
}

/// Invoice as shown to its owner and to admins.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(example = "TPC-20260301-QX7K2M")]
    pub number: String,
    #[schema(format = "uuid")]
    pub member_id: String,
    #[schema(value_type = PaymentCurrencySchema)]
    pub currency: PaymentCurrency,
    /// Amount in the currency's minor unit (cents for USDC, rupiah for IDR).
    pub amount_input: i64,
    pub tpc_amount: i64,
    #[schema(value_type = InvoiceStatusSchema)]
    pub status: InvoiceStatus,
    pub proof_url: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub expires_at: String,
    #[schema(format = "date-time")]
    pub paid_at: Option<String>,
    #[schema(format = "uuid")]
    pub reviewed_by: Option<String>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id.to_string(),
            number: invoice.number.to_string(),
            member_id: invoice.member_id.to_string(),
            currency: invoice.currency,
            amount_input: invoice.amount_input,
            tpc_amount: invoice.tpc_amount,
            status: invoice.status,
            proof_url: invoice.proof_url,
            created_at: invoice.created_at.to_rfc3339(),
            expires_at: invoice.expires_at.to_rfc3339(),
            paid_at: invoice.paid_at.map(|at| at.to_rfc3339()),
            reviewed_by: invoice.reviewed_by.map(|id| id.to_string()),
        }
    }
}

/// Withdrawal request as shown to its owner and to admins.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub member_id: String,
    pub tpc_amount: i64,
    pub wallet_address: String,
    #[schema(value_type = WithdrawalStatusSchema)]
    pub status: WithdrawalStatus,
    pub note: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub reviewed_at: Option<String>,
}

impl From<Withdrawal> for WithdrawalResponse {
    fn from(withdrawal: Withdrawal) -> Self {
        Self {
            id: withdrawal.id.to_string(),
            member_id: withdrawal.member_id.to_string(),
            tpc_amount: withdrawal.tpc_amount,
            wallet_address: withdrawal.wallet_address.as_ref().to_owned(),
            status: withdrawal.status,
            note: withdrawal.note,
            created_at: withdrawal.created_at.to_rfc3339(),
            reviewed_at: withdrawal.reviewed_at.map(|at| at.to_rfc3339()),
        }
    }
}

pub(crate) fn collect<T, R: From<T>>(items: Vec<T>) -> Vec<R> {
    items.into_iter().map(R::from).collect()
}
