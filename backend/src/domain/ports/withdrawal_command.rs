//! Driving ports for withdrawal requests and their review.

use async_trait::async_trait;

use crate::domain::{
    Error, MemberId, ReviewDecision, Withdrawal, WithdrawalId, WithdrawalStatus,
};

/// Request to withdraw tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    /// Whole tokens to send.
    pub tpc_amount: i64,
    /// Destination wallet as entered.
    pub wallet_address: String,
}

/// Driving port for withdrawal write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WithdrawalCommand: Send + Sync {
    /// Open a pending request for `member`.
    async fn request_withdrawal(
        &self,
        member: &MemberId,
        request: WithdrawalRequest,
    ) -> Result<Withdrawal, Error>;

    /// Approve or reject a pending request.
    async fn admin_review(
        &self,
        admin: &MemberId,
        withdrawal: &WithdrawalId,
        decision: ReviewDecision,
        note: Option<String>,
    ) -> Result<Withdrawal, Error>;
}

/// Driving port for withdrawal read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WithdrawalQuery: Send + Sync {
    /// The member's requests, newest first.
    async fn list_member_withdrawals(&self, member: &MemberId) -> Result<Vec<Withdrawal>, Error>;

    /// Every request, newest first, optionally filtered by status.
    async fn admin_list_withdrawals(
        &self,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<Withdrawal>, Error>;
}
