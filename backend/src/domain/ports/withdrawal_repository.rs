//! Port for withdrawal persistence.

use async_trait::async_trait;

use crate::domain::{MemberId, Withdrawal, WithdrawalId, WithdrawalStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by withdrawal repository adapters.
    pub enum WithdrawalRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "withdrawal repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "withdrawal repository query failed: {message}",
    }
}

/// Port for reading and writing withdrawal requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WithdrawalRepository: Send + Sync {
    /// Persist a new request.
    async fn insert(&self, withdrawal: &Withdrawal) -> Result<(), WithdrawalRepositoryError>;

    /// Find a request by id.
    async fn find_by_id(
        &self,
        id: &WithdrawalId,
    ) -> Result<Option<Withdrawal>, WithdrawalRepositoryError>;

    /// A member's requests, newest first.
    async fn list_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<Withdrawal>, WithdrawalRepositoryError>;

    /// All requests, newest first, optionally filtered by status.
    async fn list(
        &self,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<Withdrawal>, WithdrawalRepositoryError>;

    /// Store a review if the stored row is still pending.
    ///
    /// Returns `false` when another review got there first.
    async fn record_review(
        &self,
        withdrawal: &Withdrawal,
    ) -> Result<bool, WithdrawalRepositoryError>;
}

/// Fixture implementation for tests that do not exercise withdrawal storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureWithdrawalRepository;

#[async_trait]
impl WithdrawalRepository for FixtureWithdrawalRepository {
    async fn insert(&self, _withdrawal: &Withdrawal) -> Result<(), WithdrawalRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &WithdrawalId,
    ) -> Result<Option<Withdrawal>, WithdrawalRepositoryError> {
        Ok(None)
    }

    async fn list_for_member(
        &self,
        _member_id: &MemberId,
    ) -> Result<Vec<Withdrawal>, WithdrawalRepositoryError> {
        Ok(Vec::new())
    }

    async fn list(
        &self,
        _status: Option<WithdrawalStatus>,
    ) -> Result<Vec<Withdrawal>, WithdrawalRepositoryError> {
        Ok(Vec::new())
    }

    async fn record_review(
        &self,
        _withdrawal: &Withdrawal,
    ) -> Result<bool, WithdrawalRepositoryError> {
        Ok(false)
    }
}
