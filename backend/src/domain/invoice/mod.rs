//! Token purchase invoices and their lifecycle.
//!
//! ```text
//!            submit_proof            approve
//! UNPAID ───────────────▶ PENDING_REVIEW ───────▶ PAID
//!   │  │                          │
//!   │  └─ expire ─▶ EXPIRED       └─ reject ─▶ CANCELLED
//!   └─ cancel ─▶ CANCELLED
//! ```
//!
//! Every other transition is rejected. `PAID`, `CANCELLED` and `EXPIRED` are
//! terminal.

mod pricing;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::MemberId;

pub use pricing::{PricingConfig, PricingError, Quote};

/// Stable invoice identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(Uuid);

impl InvoiceId {
    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Issued, awaiting payment.
    Unpaid,
    /// Payment proof uploaded, awaiting an admin.
    PendingReview,
    /// Approved by an admin.
    Paid,
    /// Cancelled by the member or rejected by an admin.
    Cancelled,
    /// Not paid before `expires_at`.
    Expired,
}

impl InvoiceStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Unpaid,
        Self::PendingReview,
        Self::Paid,
        Self::Cancelled,
        Self::Expired,
    ];

    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::PendingReview => "PENDING_REVIEW",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled | Self::Expired)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown invoice status '{0}'")]
pub struct UnknownInvoiceStatus(pub String);

impl FromStr for InvoiceStatus {
    type Err = UnknownInvoiceStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownInvoiceStatus(s.to_owned()))
    }
}

/// Currency the member pays in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentCurrency {
    /// USD Coin; amounts in cents.
    Usdc,
    /// Indonesian rupiah; amounts in whole rupiah.
    Idr,
}

impl PaymentCurrency {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usdc => "USDC",
            Self::Idr => "IDR",
        }
    }
}

impl fmt::Display for PaymentCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown currency string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported payment currency '{0}'")]
pub struct UnknownCurrency(pub String);

impl FromStr for PaymentCurrency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USDC" => Ok(Self::Usdc),
            "IDR" => Ok(Self::Idr),
            _ => Err(UnknownCurrency(s.to_owned())),
        }
    }
}

/// Error returned when an invoice number is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invoice number must look like TPC-YYYYMMDD-XXXXXX")]
pub struct InvalidInvoiceNumber;

/// Human-facing invoice number, `TPC-YYYYMMDD-XXXXXX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Validate an invoice number.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidInvoiceNumber> {
        let value = raw.as_ref().trim();
        let mut parts = value.split('-');
        let (Some("TPC"), Some(date), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(InvalidInvoiceNumber);
        };
        if NaiveDate::parse_from_str(date, "%Y%m%d").is_err() || date.len() != 8 {
            return Err(InvalidInvoiceNumber);
        }
        if suffix.len() != 6
            || !suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        {
            return Err(InvalidInvoiceNumber);
        }
        Ok(Self(value.to_owned()))
    }

    pub(crate) fn compose(issued_at: DateTime<Utc>, suffix: &str) -> Self {
        Self(format!("TPC-{}-{suffix}", issued_at.format("%Y%m%d")))
    }
}

impl AsRef<str> for InvoiceNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when a payment proof link is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payment proof must be an http or https URL")]
pub struct InvalidProofUrl;

/// Link to an uploaded transfer receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofUrl(Url);

impl ProofUrl {
    /// Parse and validate a proof link.
    pub fn new(raw: &str) -> Result<Self, InvalidProofUrl> {
        let url = Url::parse(raw.trim()).map_err(|_| InvalidProofUrl)?;
        match url.scheme() {
            "http" | "https" if url.host().is_some() => Ok(Self(url)),
            _ => Err(InvalidProofUrl),
        }
    }

    /// Borrow the URL text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Operation attempted on an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceAction {
    /// Member uploads payment proof.
    SubmitProof,
    /// Member or admin cancels.
    Cancel,
    /// Admin confirms payment.
    Approve,
    /// Admin rejects the proof.
    Reject,
    /// Sweep marks an overdue invoice.
    Expire,
}

impl InvoiceAction {
    fn verb(self) -> &'static str {
        match self {
            Self::SubmitProof => "submit proof for",
            Self::Cancel => "cancel",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Expire => "expire",
        }
    }
}

/// Lifecycle violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvoiceTransitionError {
    /// The invoice is not in a state that allows the action.
    #[error("cannot {} an invoice that is {from}", .action.verb())]
    InvalidState {
        /// Attempted action.
        action: InvoiceAction,
        /// Current status.
        from: InvoiceStatus,
    },
    /// The payment window has closed.
    #[error("invoice expired at {expires_at}")]
    PastExpiry {
        /// End of the payment window.
        expires_at: DateTime<Utc>,
    },
    /// Expiry requested before the payment window closed.
    #[error("invoice does not expire until {expires_at}")]
    NotYetDue {
        /// End of the payment window.
        expires_at: DateTime<Utc>,
    },
}

/// Input for issuing a new invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    /// Identifier to assign.
    pub id: InvoiceId,
    /// Number to print on the invoice.
    pub number: InvoiceNumber,
    /// Purchasing member.
    pub member_id: MemberId,
    /// Priced purchase.
    pub quote: Quote,
    /// Issue time.
    pub created_at: DateTime<Utc>,
    /// Length of the payment window.
    pub ttl: Duration,
}

/// Token purchase request.
///
/// ## Invariants
/// - `amount_input` and `tpc_amount` are positive.
/// - `paid_at` is set exactly when the status is `PAID`.
/// - `expires_at` is after `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    /// Stable identifier.
    pub id: InvoiceId,
    /// Printed invoice number.
    pub number: InvoiceNumber,
    /// Purchasing member.
    pub member_id: MemberId,
    /// Payment currency.
    pub currency: PaymentCurrency,
    /// Amount to pay in the currency's minor unit.
    pub amount_input: i64,
    /// Whole tokens credited once paid.
    pub tpc_amount: i64,
    /// Lifecycle state.
    pub status: InvoiceStatus,
    /// Uploaded transfer receipt.
    pub proof_url: Option<String>,
    /// Issue time.
    pub created_at: DateTime<Utc>,
    /// End of the payment window.
    pub expires_at: DateTime<Utc>,
    /// Approval time.
    pub paid_at: Option<DateTime<Utc>>,
    /// Admin who approved or rejected the proof.
    pub reviewed_by: Option<MemberId>,
}

impl Invoice {
    /// Issue a new unpaid invoice.
    pub fn issue(draft: InvoiceDraft) -> Self {
        let ttl = draft.ttl.max(Duration::minutes(1));
        Self {
            id: draft.id,
            number: draft.number,
            member_id: draft.member_id,
            currency: draft.quote.currency,
            amount_input: draft.quote.amount_input,
            tpc_amount: draft.quote.tpc_amount,
            status: InvoiceStatus::Unpaid,
            proof_url: None,
            created_at: draft.created_at,
            expires_at: draft.created_at + ttl,
            paid_at: None,
            reviewed_by: None,
        }
    }

    /// Whether the payment window has closed at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    fn require(
        &self,
        action: InvoiceAction,
        expected: InvoiceStatus,
    ) -> Result<(), InvoiceTransitionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(InvoiceTransitionError::InvalidState {
                action,
                from: self.status,
            })
        }
    }

    /// Attach payment proof and move to review.
    pub fn submit_proof(
        &mut self,
        proof: &ProofUrl,
        now: DateTime<Utc>,
    ) -> Result<(), InvoiceTransitionError> {
        self.require(InvoiceAction::SubmitProof, InvoiceStatus::Unpaid)?;
        if self.is_overdue(now) {
            return Err(InvoiceTransitionError::PastExpiry {
                expires_at: self.expires_at,
            });
        }
        self.proof_url = Some(proof.as_str().to_owned());
        self.status = InvoiceStatus::PendingReview;
        Ok(())
    }

    /// Cancel an unpaid invoice.
    pub fn cancel(&mut self) -> Result<(), InvoiceTransitionError> {
        self.require(InvoiceAction::Cancel, InvoiceStatus::Unpaid)?;
        self.status = InvoiceStatus::Cancelled;
        Ok(())
    }

    /// Confirm payment.
    pub fn approve(
        &mut self,
        admin: MemberId,
        now: DateTime<Utc>,
    ) -> Result<(), InvoiceTransitionError> {
        self.require(InvoiceAction::Approve, InvoiceStatus::PendingReview)?;
        self.status = InvoiceStatus::Paid;
        self.paid_at = Some(now);
        self.reviewed_by = Some(admin);
        Ok(())
    }

    /// Reject submitted proof.
    pub fn reject(&mut self, admin: MemberId) -> Result<(), InvoiceTransitionError> {
        self.require(InvoiceAction::Reject, InvoiceStatus::PendingReview)?;
        self.status = InvoiceStatus::Cancelled;
        self.reviewed_by = Some(admin);
        Ok(())
    }

    /// Mark an overdue unpaid invoice as expired.
    ///
    /// Mirrors the sweep's `status = UNPAID AND expires_at < now` filter.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Result<(), InvoiceTransitionError> {
        self.require(InvoiceAction::Expire, InvoiceStatus::Unpaid)?;
        if self.expires_at >= now {
            return Err(InvoiceTransitionError::NotYetDue {
                expires_at: self.expires_at,
            });
        }
        self.status = InvoiceStatus::Expired;
        Ok(())
    }
}
