//! Withdrawal request service.
//!
//! Requests are recorded as pending and announced by email; balances are not
//! checked here. Reviews are written with a compare-and-set on the pending
//! status, so two admins cannot both decide the same request.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use super::notification;
use super::notification_service::Mailer;
use super::port_error_mapping::{map_profile_repository_error, map_withdrawal_repository_error};
use super::ports::{
    ProfileRepository, WithdrawalCommand, WithdrawalQuery, WithdrawalRepository, WithdrawalRequest,
};
use super::{
    Error, MemberId, ReviewDecision, WalletAddress, Withdrawal, WithdrawalId,
    WithdrawalStatus, WithdrawalValidationError, normalize_note,
};

/// Service implementing [`WithdrawalCommand`] and [`WithdrawalQuery`].
#[derive(Clone)]
pub struct WithdrawalService<W, P> {
    withdrawals: Arc<W>,
    profiles: Arc<P>,
    mailer: Mailer,
    clock: Arc<dyn Clock>,
}

fn map_validation_error(error: WithdrawalValidationError) -> Error {
    let field = match error {
        WithdrawalValidationError::NonPositiveAmount => "tpcAmount",
        WithdrawalValidationError::InvalidWalletAddress => "walletAddress",
        WithdrawalValidationError::NoteTooLong => "note",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

impl<W, P> WithdrawalService<W, P> {
    /// Create the service.
    pub fn new(withdrawals: Arc<W>, profiles: Arc<P>, mailer: Mailer, clock: Arc<dyn Clock>) -> Self {
        Self {
            withdrawals,
            profiles,
            mailer,
            clock,
        }
    }
}

impl<W, P> WithdrawalService<W, P>
where
    W: WithdrawalRepository,
    P: ProfileRepository,
{
    async fn announce(&self, withdrawal: &Withdrawal) {
        let profile = match self.profiles.find_by_id(&withdrawal.member_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(withdrawal_id = %withdrawal.id, "withdrawal owner profile missing");
                return;
            }
            Err(error) => {
                warn!(withdrawal_id = %withdrawal.id, %error, "withdrawal owner lookup failed");
                return;
            }
        };
        self.mailer
            .send_best_effort(
                &notification::withdrawal_received(&profile, withdrawal),
                "withdrawal_received",
            )
            .await;
        let alert =
            notification::admin_withdrawal_requested(self.mailer.admin(), &profile, withdrawal);
        self.mailer
            .send_best_effort(&alert, "admin_withdrawal_requested")
            .await;
    }
}

#[async_trait]
impl<W, P> WithdrawalCommand for WithdrawalService<W, P>
where
    W: WithdrawalRepository,
    P: ProfileRepository,
{
    async fn request_withdrawal(
        &self,
        member: &MemberId,
        request: WithdrawalRequest,
    ) -> Result<Withdrawal, Error> {
        let wallet = WalletAddress::new(&request.wallet_address).map_err(map_validation_error)?;
        let withdrawal = Withdrawal::request(*member, request.tpc_amount, wallet, self.clock.utc())
            .map_err(map_validation_error)?;

        let exists = self
            .profiles
            .find_by_id(member)
            .await
            .map_err(map_profile_repository_error)?
            .is_some();
        if !exists {
            return Err(Error::unauthorized("member profile not found"));
        }

        self.withdrawals
            .insert(&withdrawal)
            .await
            .map_err(map_withdrawal_repository_error)?;
        info!(
            withdrawal_id = %withdrawal.id,
            member_id = %member,
            tpc_amount = withdrawal.tpc_amount,
            "withdrawal requested"
        );
        self.announce(&withdrawal).await;
        Ok(withdrawal)
    }

    async fn admin_review(
        &self,
        admin: &MemberId,
        withdrawal: &WithdrawalId,
        decision: ReviewDecision,
        note: Option<String>,
    ) -> Result<Withdrawal, Error> {
        let note = normalize_note(note.as_deref()).map_err(map_validation_error)?;
        let mut current = self
            .withdrawals
            .find_by_id(withdrawal)
            .await
            .map_err(map_withdrawal_repository_error)?
            .ok_or_else(|| Error::not_found(format!("withdrawal {withdrawal} not found")))?;

        current
            .review(decision, note, self.clock.utc())
            .map_err(|err| {
                Error::conflict(err.to_string()).with_details(json!({ "status": err.0.as_str() }))
            })?;
        let stored = self
            .withdrawals
            .record_review(&current)
            .await
            .map_err(map_withdrawal_repository_error)?;
        if !stored {
            return Err(Error::conflict("withdrawal was reviewed concurrently").with_details(
                json!({ "expectedStatus": WithdrawalStatus::Pending.as_str() }),
            ));
        }
        info!(
            withdrawal_id = %current.id,
            admin_id = %admin,
            status = current.status.as_str(),
            "withdrawal reviewed"
        );
        Ok(current)
    }
}

#[async_trait]
impl<W, P> WithdrawalQuery for WithdrawalService<W, P>
where
    W: WithdrawalRepository,
    P: ProfileRepository,
{
    async fn list_member_withdrawals(&self, member: &MemberId) -> Result<Vec<Withdrawal>, Error> {
        self.withdrawals
            .list_for_member(member)
            .await
            .map_err(map_withdrawal_repository_error)
    }

    async fn admin_list_withdrawals(
        &self,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<Withdrawal>, Error> {
        self.withdrawals
            .list(status)
            .await
            .map_err(map_withdrawal_repository_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{fixture_clock, fixture_timestamp, sample_profile};
    use crate::domain::{EmailAddress, ErrorCode, Language};
    use crate::test_support::{
        InMemoryProfileRepository, InMemoryWithdrawalRepository, RecordingEmailSender,
    };
    use rstest::{fixture, rstest};

    const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    struct World {
        withdrawals: Arc<InMemoryWithdrawalRepository>,
        profiles: Arc<InMemoryProfileRepository>,
        sender: RecordingEmailSender,
    }

    impl World {
        fn service(&self) -> WithdrawalService<InMemoryWithdrawalRepository, InMemoryProfileRepository> {
            WithdrawalService::new(
                Arc::clone(&self.withdrawals),
                Arc::clone(&self.profiles),
                Mailer::new(
                    Arc::new(self.sender.clone()),
                    EmailAddress::new("ops@example.com").expect("valid email"),
                ),
                fixture_clock(),
            )
        }
    }

    #[fixture]
    fn world() -> World {
        World {
            withdrawals: Arc::new(InMemoryWithdrawalRepository::default()),
            profiles: Arc::new(InMemoryProfileRepository::default()),
            sender: RecordingEmailSender::default(),
        }
    }

    fn request(amount: i64, wallet: &str) -> WithdrawalRequest {
        WithdrawalRequest {
            tpc_amount: amount,
            wallet_address: wallet.to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn request_is_pending_and_emails_member_and_admin(world: World) {
        let profile = sample_profile(Language::Id);
        world.profiles.put(profile.clone());

        let withdrawal = world
            .service()
            .request_withdrawal(&profile.id, request(750, WALLET))
            .await
            .expect("requested");

        assert_eq!(withdrawal.status, WithdrawalStatus::Pending);
        assert_eq!(withdrawal.created_at, fixture_timestamp());
        let recipients: Vec<_> = world
            .sender
            .sent()
            .into_iter()
            .map(|message| message.to.to_string())
            .collect();
        assert_eq!(recipients, ["budi@example.com", "ops@example.com"]);
    }

    #[rstest]
    #[case(0, WALLET, "tpcAmount")]
    #[case(10, "not-a-wallet", "walletAddress")]
    #[tokio::test]
    async fn invalid_requests_name_the_field(
        world: World,
        #[case] amount: i64,
        #[case] wallet: &str,
        #[case] field: &str,
    ) {
        let err = world
            .service()
            .request_withdrawal(&MemberId::random(), request(amount, wallet))
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
            Some(field)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn email_failure_does_not_fail_the_request(world: World) {
        let profile = sample_profile(Language::En);
        world.profiles.put(profile.clone());
        world.sender.fail_for(profile.email.clone());

        let result = world
            .service()
            .request_withdrawal(&profile.id, request(10, WALLET))
            .await;
        assert!(result.is_ok());
        assert_eq!(world.sender.sent().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn review_decides_once(world: World) {
        let profile = sample_profile(Language::En);
        world.profiles.put(profile.clone());
        let service = world.service();
        let pending = service
            .request_withdrawal(&profile.id, request(10, WALLET))
            .await
            .expect("requested");
        let admin = MemberId::random();

        let approved = service
            .admin_review(&admin, &pending.id, ReviewDecision::Approve, Some("  sent  ".into()))
            .await
            .expect("approved");
        assert_eq!(approved.status, WithdrawalStatus::Approved);
        assert_eq!(approved.note.as_deref(), Some("sent"));
        assert_eq!(approved.reviewed_at, Some(fixture_timestamp()));

        let err = service
            .admin_review(&admin, &pending.id, ReviewDecision::Reject, None)
            .await
            .expect_err("already reviewed");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(
            err.details().and_then(|d| d.get("status")).and_then(|s| s.as_str()),
            Some("APPROVED")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn reviewing_unknown_withdrawal_is_not_found(world: World) {
        let err = world
            .service()
            .admin_review(
                &MemberId::random(),
                &WithdrawalId::random(),
                ReviewDecision::Reject,
                None,
            )
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn admin_list_filters_by_status(world: World) {
        let profile = sample_profile(Language::En);
        world.profiles.put(profile.clone());
        let service = world.service();
        let first = service
            .request_withdrawal(&profile.id, request(10, WALLET))
            .await
            .expect("first");
        service
            .request_withdrawal(&profile.id, request(20, WALLET))
            .await
            .expect("second");
        service
            .admin_review(&MemberId::random(), &first.id, ReviewDecision::Reject, None)
            .await
            .expect("rejected");

        let pending = service
            .admin_list_withdrawals(Some(WithdrawalStatus::Pending))
            .await
            .expect("list");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].tpc_amount, 20);
        assert_eq!(
            service
                .list_member_withdrawals(&profile.id)
                .await
                .expect("member list")
                .len(),
            2
        );
    }
}
