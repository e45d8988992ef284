//! Test utilities for the backend crate.
//!
//! In-memory port adapters shared by unit tests (in `src/`) and integration
//! tests (in `tests/`). Only compiled for tests or with the `test-support`
//! feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use crate::domain::ports::{
    EmailSender, EmailSenderError, InvoiceRepository, InvoiceRepositoryError, ProfileRepository,
    ProfileRepositoryError, WithdrawalRepository, WithdrawalRepositoryError,
};
use crate::domain::{
    EmailAddress, EmailMessage, Invoice, InvoiceId, InvoiceStatus, Language, MemberId, Profile,
    ReferralCode, ReferralSummary, Withdrawal, WithdrawalId, WithdrawalStatus,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Invoice repository backed by a mutex-guarded map.
///
/// Each method holds the lock for its whole body, so
/// [`InvoiceRepository::expire_unpaid_before`] is atomic like the SQL
/// `UPDATE ... RETURNING` it stands in for.
#[derive(Debug, Default, Clone)]
pub struct InMemoryInvoiceRepository {
    rows: Arc<Mutex<HashMap<InvoiceId, Invoice>>>,
}

impl InMemoryInvoiceRepository {
    /// Seed a row directly, bypassing uniqueness checks.
    pub fn put(&self, invoice: Invoice) {
        lock(&self.rows).insert(invoice.id, invoice);
    }

    /// Read a row back.
    pub fn get(&self, id: &InvoiceId) -> Option<Invoice> {
        lock(&self.rows).get(id).cloned()
    }

    fn newest_first(mut rows: Vec<Invoice>) -> Vec<Invoice> {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn insert(&self, invoice: &Invoice) -> Result<(), InvoiceRepositoryError> {
        let mut rows = lock(&self.rows);
        if rows.values().any(|row| row.number == invoice.number) {
            return Err(InvoiceRepositoryError::duplicate_number(
                invoice.number.to_string(),
            ));
        }
        rows.insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, InvoiceRepositoryError> {
        Ok(self.get(id))
    }

    async fn list_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
        let rows = lock(&self.rows)
            .values()
            .filter(|row| row.member_id == *member_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(rows))
    }

    async fn list(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
        let rows = lock(&self.rows)
            .values()
            .filter(|row| status.is_none_or(|s| row.status == s))
            .cloned()
            .collect();
        Ok(Self::newest_first(rows))
    }

    async fn update_status(
        &self,
        invoice: &Invoice,
        expected: InvoiceStatus,
    ) -> Result<bool, InvoiceRepositoryError> {
        let mut rows = lock(&self.rows);
        match rows.get_mut(&invoice.id) {
            Some(row) if row.status == expected => {
                row.status = invoice.status;
                row.proof_url.clone_from(&invoice.proof_url);
                row.paid_at = invoice.paid_at;
                row.reviewed_by = invoice.reviewed_by;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn expire_unpaid_before(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
        let mut rows = lock(&self.rows);
        let mut expired = Vec::new();
        for row in rows.values_mut() {
            if row.status == InvoiceStatus::Unpaid && row.expires_at < now {
                row.status = InvoiceStatus::Expired;
                expired.push(row.clone());
            }
        }
        Ok(expired)
    }
}

/// Profile repository backed by a mutex-guarded map.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProfileRepository {
    rows: Arc<Mutex<HashMap<MemberId, Profile>>>,
}

impl InMemoryProfileRepository {
    /// Seed a profile directly.
    pub fn put(&self, profile: Profile) {
        lock(&self.rows).insert(profile.id, profile);
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn insert(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let mut rows = lock(&self.rows);
        if rows.values().any(|row| row.email == profile.email) {
            return Err(ProfileRepositoryError::duplicate_email());
        }
        if rows.values().any(|row| {
            row.member_code == profile.member_code || row.referral_code == profile.referral_code
        }) {
            return Err(ProfileRepositoryError::duplicate_code());
        }
        rows.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(lock(&self.rows).get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(lock(&self.rows)
            .values()
            .find(|row| row.email == *email)
            .cloned())
    }

    async fn find_by_referral_code(
        &self,
        code: &ReferralCode,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(lock(&self.rows)
            .values()
            .find(|row| row.referral_code == *code)
            .cloned())
    }

    async fn list_referrals(
        &self,
        sponsor: &MemberId,
    ) -> Result<Vec<ReferralSummary>, ProfileRepositoryError> {
        let mut referrals: Vec<_> = lock(&self.rows)
            .values()
            .filter(|row| row.sponsor_id == Some(*sponsor))
            .map(|row| ReferralSummary {
                member_id: row.id,
                full_name: row.full_name.as_ref().to_owned(),
                member_code: row.member_code.to_string(),
                joined_at: row.created_at,
            })
            .collect();
        referrals.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));
        Ok(referrals)
    }

    async fn count_referrals(&self, sponsor: &MemberId) -> Result<u64, ProfileRepositoryError> {
        let count = lock(&self.rows)
            .values()
            .filter(|row| row.sponsor_id == Some(*sponsor))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn update_language(
        &self,
        id: &MemberId,
        language: Language,
    ) -> Result<bool, ProfileRepositoryError> {
        Ok(lock(&self.rows)
            .get_mut(id)
            .map(|row| row.language = language)
            .is_some())
    }
}

/// Withdrawal repository backed by a mutex-guarded map.
#[derive(Debug, Default, Clone)]
pub struct InMemoryWithdrawalRepository {
    rows: Arc<Mutex<HashMap<WithdrawalId, Withdrawal>>>,
}

impl InMemoryWithdrawalRepository {
    fn newest_first(mut rows: Vec<Withdrawal>) -> Vec<Withdrawal> {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl WithdrawalRepository for InMemoryWithdrawalRepository {
    async fn insert(&self, withdrawal: &Withdrawal) -> Result<(), WithdrawalRepositoryError> {
        lock(&self.rows).insert(withdrawal.id, withdrawal.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &WithdrawalId,
    ) -> Result<Option<Withdrawal>, WithdrawalRepositoryError> {
        Ok(lock(&self.rows).get(id).cloned())
    }

    async fn list_for_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<Withdrawal>, WithdrawalRepositoryError> {
        let rows = lock(&self.rows)
            .values()
            .filter(|row| row.member_id == *member_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(rows))
    }

    async fn list(
        &self,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<Withdrawal>, WithdrawalRepositoryError> {
        let rows = lock(&self.rows)
            .values()
            .filter(|row| status.is_none_or(|s| row.status == s))
            .cloned()
            .collect();
        Ok(Self::newest_first(rows))
    }

    async fn record_review(
        &self,
        withdrawal: &Withdrawal,
    ) -> Result<bool, WithdrawalRepositoryError> {
        let mut rows = lock(&self.rows);
        match rows.get_mut(&withdrawal.id) {
            Some(row) if row.status == WithdrawalStatus::Pending => {
                row.status = withdrawal.status;
                row.note.clone_from(&withdrawal.note);
                row.reviewed_at = withdrawal.reviewed_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Email sender that records messages, optionally failing for some recipients.
#[derive(Debug, Default, Clone)]
pub struct RecordingEmailSender {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failing: Arc<Mutex<Vec<EmailAddress>>>,
}

impl RecordingEmailSender {
    /// Make every send to `recipient` fail with a transport error.
    pub fn fail_for(&self, recipient: EmailAddress) {
        lock(&self.failing).push(recipient);
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSenderError> {
        if lock(&self.failing).contains(&message.to) {
            return Err(EmailSenderError::transport("recipient configured to fail"));
        }
        lock(&self.sent).push(message.clone());
        Ok(())
    }
}

/// Clock whose time tests can move.
#[derive(Debug, Clone)]
pub struct MutableClock(Arc<Mutex<DateTime<Utc>>>);

impl MutableClock {
    /// Start at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(now)))
    }

    /// Jump to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.0) = now;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}
