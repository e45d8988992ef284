//! Member account service: signup, login, profile reads and the dashboard.
//!
//! Password hashing runs on the blocking pool because Argon2id is deliberately
//! slow. Member and referral codes are drawn from a [`CodeGenerator`] and
//! redrawn when the store reports a collision.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use super::codes::CodeGenerator;
use super::port_error_mapping::{map_invoice_repository_error, map_profile_repository_error};
use super::ports::{
    DashboardSummary, InvoiceCounts, InvoiceRepository, MemberAccount, MemberQuery,
    ProfileRepository, ProfileRepositoryError,
};
use super::{
    Error, Invoice, InvoiceStatus, Language, LoginCredentials, MemberId, MemberRole, Profile,
    ReferralSummary, SignupDetails, auth,
};

/// Attempts at drawing unused member and referral codes.
const CODE_ATTEMPTS: usize = 3;

const INVALID_LOGIN: &str = "invalid email or password";

/// Member service implementing [`MemberAccount`] and [`MemberQuery`].
#[derive(Clone)]
pub struct MemberService<P, I> {
    profiles: Arc<P>,
    invoices: Arc<I>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeGenerator>,
}

fn member_not_found(id: &MemberId) -> Error {
    Error::not_found(format!("member {id} not found"))
}

async fn hash_off_thread(password: String) -> Result<String, Error> {
    tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
        .map_err(|err| Error::internal(err.to_string()))
}

async fn verify_off_thread(password: String, stored: String) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || auth::verify_password(&password, &stored))
        .await
        .map_err(|err| Error::internal(format!("password check task failed: {err}")))?
        .map_err(|err| Error::internal(err.to_string()))
}

fn tally(invoices: &[Invoice]) -> (InvoiceCounts, i64, i64) {
    let mut counts = InvoiceCounts::default();
    let mut paid = 0_i64;
    let mut pending = 0_i64;
    for invoice in invoices {
        match invoice.status {
            InvoiceStatus::Unpaid => {
                counts.unpaid += 1;
                pending = pending.saturating_add(invoice.tpc_amount);
            }
            InvoiceStatus::PendingReview => {
                counts.pending_review += 1;
                pending = pending.saturating_add(invoice.tpc_amount);
            }
            InvoiceStatus::Paid => {
                counts.paid += 1;
                paid = paid.saturating_add(invoice.tpc_amount);
            }
            InvoiceStatus::Cancelled => counts.cancelled += 1,
            InvoiceStatus::Expired => counts.expired += 1,
        }
    }
    (counts, paid, pending)
}

impl<P, I> MemberService<P, I> {
    /// Create the service.
    pub fn new(
        profiles: Arc<P>,
        invoices: Arc<I>,
        clock: Arc<dyn Clock>,
        codes: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            profiles,
            invoices,
            clock,
            codes,
        }
    }
}

impl<P, I> MemberService<P, I>
where
    P: ProfileRepository,
    I: InvoiceRepository,
{
    async fn load(&self, id: &MemberId) -> Result<Profile, Error> {
        self.profiles
            .find_by_id(id)
            .await
            .map_err(map_profile_repository_error)?
            .ok_or_else(|| member_not_found(id))
    }

    async fn resolve_sponsor(&self, details: &SignupDetails) -> Result<Option<MemberId>, Error> {
        let Some(code) = details.referral_code() else {
            return Ok(None);
        };
        let sponsor = self
            .profiles
            .find_by_referral_code(code)
            .await
            .map_err(map_profile_repository_error)?
            .ok_or_else(|| {
                Error::invalid_request(format!("referral code {code} does not exist"))
                    .with_details(json!({ "field": "referralCode", "code": "unknown" }))
            })?;
        Ok(Some(sponsor.id))
    }

    async fn summarise(&self, member: &MemberId) -> Result<DashboardSummary, Error> {
        let invoices = self
            .invoices
            .list_for_member(member)
            .await
            .map_err(map_invoice_repository_error)?;
        let referral_count = self
            .profiles
            .count_referrals(member)
            .await
            .map_err(map_profile_repository_error)?;
        let (counts, tpc_paid, tpc_pending) = tally(&invoices);
        Ok(DashboardSummary {
            invoices: counts,
            tpc_paid,
            tpc_pending,
            referral_count,
        })
    }
}

#[async_trait]
impl<P, I> MemberAccount for MemberService<P, I>
where
    P: ProfileRepository,
    I: InvoiceRepository,
{
    async fn signup(&self, details: SignupDetails) -> Result<Profile, Error> {
        let existing = self
            .profiles
            .find_by_email(details.email())
            .await
            .map_err(map_profile_repository_error)?;
        if existing.is_some() {
            return Err(Error::conflict("email address is already registered")
                .with_details(json!({ "field": "email" })));
        }

        let sponsor_id = self.resolve_sponsor(&details).await?;
        let password_hash = hash_off_thread(details.password().to_owned()).await?;
        let created_at = self.clock.utc();

        for attempt in 1..=CODE_ATTEMPTS {
            let profile = Profile {
                id: MemberId::random(),
                email: details.email().clone(),
                full_name: details.full_name().clone(),
                member_code: self.codes.member_code(),
                referral_code: self.codes.referral_code(),
                sponsor_id,
                role: MemberRole::Member,
                language: details.language(),
                password_hash: password_hash.clone(),
                created_at,
            };
            match self.profiles.insert(&profile).await {
                Ok(()) => {
                    info!(
                        member_id = %profile.id,
                        member_code = %profile.member_code,
                        sponsored = sponsor_id.is_some(),
                        "member signed up"
                    );
                    return Ok(profile);
                }
                Err(ProfileRepositoryError::DuplicateCode) => {
                    warn!(attempt, "member code collided; drawing another");
                }
                Err(ProfileRepositoryError::DuplicateEmail) => {
                    return Err(Error::conflict("email address is already registered")
                        .with_details(json!({ "field": "email" })));
                }
                Err(other) => return Err(map_profile_repository_error(other)),
            }
        }
        Err(Error::internal("could not allocate unique member codes"))
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<MemberId, Error> {
        let profile = self
            .profiles
            .find_by_email(credentials.email())
            .await
            .map_err(map_profile_repository_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_LOGIN))?;

        let matches = verify_off_thread(
            credentials.password().to_owned(),
            profile.password_hash.clone(),
        )
        .await?;
        if !matches {
            return Err(Error::unauthorized(INVALID_LOGIN));
        }
        info!(member_id = %profile.id, "member logged in");
        Ok(profile.id)
    }

    async fn update_language(
        &self,
        member: &MemberId,
        language: Language,
    ) -> Result<Profile, Error> {
        let updated = self
            .profiles
            .update_language(member, language)
            .await
            .map_err(map_profile_repository_error)?;
        if !updated {
            return Err(member_not_found(member));
        }
        self.load(member).await
    }
}

#[async_trait]
impl<P, I> MemberQuery for MemberService<P, I>
where
    P: ProfileRepository,
    I: InvoiceRepository,
{
    async fn get_profile(&self, member: &MemberId) -> Result<Profile, Error> {
        self.load(member).await
    }

    async fn list_referrals(&self, member: &MemberId) -> Result<Vec<ReferralSummary>, Error> {
        self.profiles
            .list_referrals(member)
            .await
            .map_err(map_profile_repository_error)
    }

    async fn dashboard_summary(&self, member: &MemberId) -> Result<DashboardSummary, Error> {
        match self.summarise(member).await {
            Ok(summary) => Ok(summary),
            Err(error) => {
                warn!(
                    member_id = %member,
                    code = ?error.code(),
                    message = error.message(),
                    "dashboard summary unavailable; returning zeroed summary"
                );
                Ok(DashboardSummary::default())
            }
        }
    }
}

#[cfg(test)]
#[path = "member_service_tests.rs"]
mod tests;
