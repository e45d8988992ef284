//! Driving port for member account changes: signup, login and preferences.
//!
//! Inbound adapters call it without knowing how passwords are hashed or where
//! profiles live, so HTTP handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, Language, LoginCredentials, MemberId, Profile, SignupDetails};

/// Driving port for account write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberAccount: Send + Sync {
    /// Create a profile, attaching it to the sponsor that owns the referral
    /// code when one is given.
    async fn signup(&self, details: SignupDetails) -> Result<Profile, Error>;

    /// Validate credentials and return the authenticated member id.
    async fn login(&self, credentials: &LoginCredentials) -> Result<MemberId, Error>;

    /// Store the member's preferred language.
    async fn update_language(&self, member: &MemberId, language: Language)
    -> Result<Profile, Error>;
}
