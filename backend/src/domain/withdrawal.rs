//! Token withdrawal requests.
//!
//! A member asks for earned tokens to be sent to a wallet; an admin approves
//! or rejects the request once. Balances are not checked here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MemberId;

/// Minimum wallet address length.
pub const WALLET_ADDRESS_MIN: usize = 26;
/// Maximum wallet address length.
pub const WALLET_ADDRESS_MAX: usize = 128;
/// Maximum review note length.
pub const REVIEW_NOTE_MAX: usize = 500;

/// Validation failures for withdrawal input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WithdrawalValidationError {
    /// Amount is zero or negative.
    #[error("withdrawal amount must be positive")]
    NonPositiveAmount,
    /// Wallet address has the wrong length or characters.
    #[error(
        "wallet address must be {WALLET_ADDRESS_MIN}-{WALLET_ADDRESS_MAX} letters or digits"
    )]
    InvalidWalletAddress,
    /// Review note is too long.
    #[error("note must be at most {REVIEW_NOTE_MAX} characters")]
    NoteTooLong,
}

/// Stable withdrawal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WithdrawalId(Uuid);

impl WithdrawalId {
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

impl fmt::Display for WithdrawalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Destination wallet, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Validate a wallet address.
    ///
    /// # Examples
    /// ```
    /// use tpc_backend::domain::WalletAddress;
    ///
    /// let wallet = WalletAddress::new("  7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU ").unwrap();
    /// assert_eq!(wallet.as_ref(), "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, WithdrawalValidationError> {
        let trimmed = raw.as_ref().trim();
        let len = trimmed.len();
        if !(WALLET_ADDRESS_MIN..=WALLET_ADDRESS_MAX).contains(&len)
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(WithdrawalValidationError::InvalidWalletAddress);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Review state of a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    /// Awaiting an admin.
    Pending,
    /// Admin sent the tokens.
    Approved,
    /// Admin declined the request.
    Rejected,
}

impl WithdrawalStatus {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown withdrawal status '{0}'")]
pub struct UnknownWithdrawalStatus(pub String);

impl FromStr for WithdrawalStatus {
    type Err = UnknownWithdrawalStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(UnknownWithdrawalStatus(s.to_owned())),
        }
    }
}

/// Admin decision on a pending withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    /// Tokens were sent.
    Approve,
    /// Request declined.
    Reject,
}

/// Error returned when parsing an unknown review decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decision must be 'approve' or 'reject', got '{0}'")]
pub struct UnknownDecision(pub String);

impl FromStr for ReviewDecision {
    type Err = UnknownDecision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(UnknownDecision(s.to_owned())),
        }
    }
}

/// Attempted review of a withdrawal that is no longer pending.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("withdrawal was already {0}")]
pub struct AlreadyReviewed(pub WithdrawalStatus);

/// Token withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// Stable identifier.
    pub id: WithdrawalId,
    /// Requesting member.
    pub member_id: MemberId,
    /// Whole tokens to send.
    pub tpc_amount: i64,
    /// Destination wallet.
    pub wallet_address: WalletAddress,
    /// Review state.
    pub status: WithdrawalStatus,
    /// Admin note attached at review.
    pub note: Option<String>,
    /// Request time.
    pub created_at: DateTime<Utc>,
    /// Review time.
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Withdrawal {
    /// Open a pending request.
    pub fn request(
        member_id: MemberId,
        tpc_amount: i64,
        wallet_address: WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<Self, WithdrawalValidationError> {
        if tpc_amount <= 0 {
            return Err(WithdrawalValidationError::NonPositiveAmount);
        }
        Ok(Self {
            id: WithdrawalId::random(),
            member_id,
            tpc_amount,
            wallet_address,
            status: WithdrawalStatus::Pending,
            note: None,
            created_at: now,
            reviewed_at: None,
        })
    }

    /// Apply an admin decision; only pending requests can be reviewed.
    pub fn review(
        &mut self,
        decision: ReviewDecision,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), AlreadyReviewed> {
        if self.status != WithdrawalStatus::Pending {
            return Err(AlreadyReviewed(self.status));
        }
        self.status = match decision {
            ReviewDecision::Approve => WithdrawalStatus::Approved,
            ReviewDecision::Reject => WithdrawalStatus::Rejected,
        };
        self.note = note;
        self.reviewed_at = Some(now);
        Ok(())
    }
}

/// Normalise an optional admin note: blank becomes `None`.
pub fn normalize_note(note: Option<&str>) -> Result<Option<String>, WithdrawalValidationError> {
    let Some(trimmed) = note.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > REVIEW_NOTE_MAX {
        return Err(WithdrawalValidationError::NoteTooLong);
    }
    Ok(Some(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    fn pending() -> Withdrawal {
        Withdrawal::request(
            MemberId::random(),
            250,
            WalletAddress::new(WALLET).expect("valid wallet"),
            Utc::now(),
        )
        .expect("valid request")
    }

    #[rstest]
    #[case("short")]
    #[case("0x5290-8400098527886E0F7030069857D2E4169EE7")]
    #[case("                                   ")]
    fn rejects_bad_wallets(#[case] raw: &str) {
        assert_eq!(
            WalletAddress::new(raw),
            Err(WithdrawalValidationError::InvalidWalletAddress)
        );
    }

    #[rstest]
    fn rejects_non_positive_amounts() {
        let wallet = WalletAddress::new(WALLET).expect("valid wallet");
        let err = Withdrawal::request(MemberId::random(), 0, wallet, Utc::now())
            .expect_err("zero amount");
        assert_eq!(err, WithdrawalValidationError::NonPositiveAmount);
    }

    #[rstest]
    #[case(ReviewDecision::Approve, WithdrawalStatus::Approved)]
    #[case(ReviewDecision::Reject, WithdrawalStatus::Rejected)]
    fn review_applies_once(#[case] decision: ReviewDecision, #[case] expected: WithdrawalStatus) {
        let mut withdrawal = pending();
        withdrawal
            .review(decision, Some("sent".to_owned()), Utc::now())
            .expect("first review");
        assert_eq!(withdrawal.status, expected);
        assert!(withdrawal.reviewed_at.is_some());

        let err = withdrawal
            .review(ReviewDecision::Approve, None, Utc::now())
            .expect_err("second review");
        assert_eq!(err, AlreadyReviewed(expected));
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("  "), None)]
    #[case(Some(" tx 0xabc "), Some("tx 0xabc"))]
    fn notes_are_trimmed(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(
            normalize_note(raw),
            Ok(expected.map(str::to_owned))
        );
    }

    #[rstest]
    #[case(" APPROVE ", Ok(ReviewDecision::Approve))]
    #[case("reject", Ok(ReviewDecision::Reject))]
    #[case("hold", Err(UnknownDecision("hold".to_owned())))]
    fn parses_decisions(#[case] raw: &str, #[case] expected: Result<ReviewDecision, UnknownDecision>) {
        assert_eq!(raw.parse::<ReviewDecision>(), expected);
    }
}
