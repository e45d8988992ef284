//! PostgreSQL-backed `WithdrawalRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{WithdrawalRepository, WithdrawalRepositoryError};
use crate::domain::{MemberId, WalletAddress, Withdrawal, WithdrawalId, WithdrawalStatus};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewWithdrawalRow, WithdrawalReviewUpdate, WithdrawalRow};
use super::pool::{DbPool, PoolError};
use super::schema::withdrawals;

/// Diesel-backed implementation of the `WithdrawalRepository` port.
#[derive(Clone)]
pub struct DieselWithdrawalRepository {
    pool: DbPool,
}

impl DieselWithdrawalRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WithdrawalRepositoryError {
    map_basic_pool_error(error, WithdrawalRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> WithdrawalRepositoryError {
    map_basic_diesel_error(
        error,
        WithdrawalRepositoryError::query,
        WithdrawalRepositoryError::connection,
    )
}

fn row_to_withdrawal(row: WithdrawalRow) -> Result<Withdrawal, WithdrawalRepositoryError> {
    let id = row.id;
    let wallet_address = WalletAddress::new(&row.wallet_address).map_err(|err| {
        WithdrawalRepositoryError::query(format!("withdrawal {id} has invalid wallet: {err}"))
    })?;
    let status = row.status.parse::<WithdrawalStatus>().map_err(|err| {
        WithdrawalRepositoryError::query(format!("withdrawal {id} has invalid status: {err}"))
    })?;
    Ok(Withdrawal {
        id: WithdrawalId::from_uuid(id),
        member_id: MemberId::from_uuid(row.member_id),
        tpc_amount: row.tpc_amount,
        wallet_address,
        status,
        note: row.note,
        created_at: row.created_at,
        reviewed_at: row.reviewed_at,
    })
}

fn rows_to_withdrawals(
    rows: Vec<WithdrawalRow>,
) -> Result<Vec<Withdrawal>, WithdrawalRepositoryError> {
    rows.into_iter().map(row_to_withdrawal).collect()
}

#[async_trait]
impl WithdrawalRepository for DieselWithdrawalRepository {
    async fn insert(&self, withdrawal: &Withdrawal) -> Result<(), WithdrawalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewWithdrawalRow {
            id: *withdrawal.id.as_uuid(),
            member_id: *withdrawal.member_id.as_uuid(),
            tpc_amount: withdrawal.tpc_amount,
            wallet_address: withdrawal.wallet_address.as_ref(),
            status: withdrawal.status.as_str(),
            created_at: withdrawal.created_at,
        };
        diesel::insert_into(withdrawals::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &WithdrawalId,
    ) -> Result<Option<Withdrawal>, WithdrawalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<WithdrawalRow> = withdrawals::table
            .filter(withdrawals::id.eq(id.as_uuid()))
            .select(WithdrawalRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_withdrawal).transpose()
    }

    async fn list_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<Withdrawal>, WithdrawalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<WithdrawalRow> = withdrawals::table
            .filter(withdrawals::member_id.eq(member_id.as_uuid()))
            .order((withdrawals::created_at.desc(), withdrawals::id.desc()))
            .select(WithdrawalRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_withdrawals(rows)
    }

    async fn list(
        &self,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<Withdrawal>, WithdrawalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = withdrawals::table
            .select(WithdrawalRow::as_select())
            .order((withdrawals::created_at.desc(), withdrawals::id.desc()))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(withdrawals::status.eq(status.as_str()));
        }
        let rows: Vec<WithdrawalRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows_to_withdrawals(rows)
    }

    async fn record_review(
        &self,
        withdrawal: &Withdrawal,
    ) -> Result<bool, WithdrawalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = WithdrawalReviewUpdate {
            status: withdrawal.status.as_str(),
            note: withdrawal.note.as_deref(),
            reviewed_at: withdrawal.reviewed_at,
        };
        let updated = diesel::update(
            withdrawals::table.filter(
                withdrawals::id
                    .eq(withdrawal.id.as_uuid())
                    .and(withdrawals::status.eq(WithdrawalStatus::Pending.as_str())),
            ),
        )
        .set(&update)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
