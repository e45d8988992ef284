//! Port for member profile persistence and referral lookups.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Language, MemberId, Profile, ReferralCode, ReferralSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by profile repository adapters.
    pub enum ProfileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "profile repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "profile repository query failed: {message}",
        /// A profile with this email already exists.
        DuplicateEmail =>
            "email address is already registered",
        /// The generated member or referral code collided.
        DuplicateCode =>
            "generated member code collided with an existing profile",
    }
}

/// Port for reading and writing member profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Persist a new profile.
    async fn insert(&self, profile: &Profile) -> Result<(), ProfileRepositoryError>;

    /// Find a profile by id.
    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Find a profile by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Find the profile that owns a referral code.
    async fn find_by_referral_code(
        &self,
        code: &ReferralCode,
    ) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Direct referrals of `sponsor`, newest first.
    async fn list_referrals(
        &self,
        sponsor: &MemberId,
    ) -> Result<Vec<ReferralSummary>, ProfileRepositoryError>;

    /// Number of direct referrals of `sponsor`.
    async fn count_referrals(&self, sponsor: &MemberId) -> Result<u64, ProfileRepositoryError>;

    /// Store a new preferred language; returns `false` when no profile matched.
    async fn update_language(
        &self,
        id: &MemberId,
        language: Language,
    ) -> Result<bool, ProfileRepositoryError>;
}

/// Fixture implementation for tests that do not exercise profile storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProfileRepository;

#[async_trait]
impl ProfileRepository for FixtureProfileRepository {
    async fn insert(&self, _profile: &Profile) -> Result<(), ProfileRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &MemberId) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(None)
    }

    async fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(None)
    }

    async fn find_by_referral_code(
        &self,
        _code: &ReferralCode,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(None)
    }

    async fn list_referrals(
        &self,
        _sponsor: &MemberId,
    ) -> Result<Vec<ReferralSummary>, ProfileRepositoryError> {
        Ok(Vec::new())
    }

    async fn count_referrals(&self, _sponsor: &MemberId) -> Result<u64, ProfileRepositoryError> {
        Ok(0)
    }

    async fn update_language(
        &self,
        _id: &MemberId,
        _language: Language,
    ) -> Result<bool, ProfileRepositoryError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_lookups_return_nothing() {
        let repo = FixtureProfileRepository;
        let email = EmailAddress::new("a@b.co").expect("valid email");
        assert!(
            repo.find_by_email(&email)
                .await
                .expect("fixture lookup")
                .is_none()
        );
        assert_eq!(
            repo.count_referrals(&MemberId::random())
                .await
                .expect("fixture count"),
            0
        );
    }

    #[rstest]
    fn unit_variants_have_constructors() {
        assert_eq!(
            ProfileRepositoryError::duplicate_email(),
            ProfileRepositoryError::DuplicateEmail
        );
    }
}
