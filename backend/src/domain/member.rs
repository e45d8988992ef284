//! Member profiles and referral identity.
//!
//! A profile is created at signup and links to the sponsoring member through
//! the referral code the new member entered. Those sponsor links form the
//! referral tree; payouts over that tree are computed elsewhere.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Language;

/// Validation errors for member-facing values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemberValidationError {
    /// Email address is blank or malformed.
    #[error("email address is not valid")]
    InvalidEmail,
    /// Full name is blank.
    #[error("full name must not be empty")]
    EmptyFullName,
    /// Full name exceeds the storage limit.
    #[error("full name must be at most {max} characters")]
    FullNameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Referral code does not match the expected shape.
    #[error("referral code must be {len} letters or digits")]
    InvalidReferralCode {
        /// Required length.
        len: usize,
    },
    /// Member code does not match the expected shape.
    #[error("member code must be 'TPC' followed by six digits")]
    InvalidMemberCode,
    /// Role is not one of the known roles.
    #[error("unknown member role '{0}'")]
    UnknownRole(String),
}

/// Stable member identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(Uuid);

impl MemberId {
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

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MemberId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Maximum accepted email length.
pub const EMAIL_MAX: usize = 254;

/// Lower-cased, trimmed email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use tpc_backend::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Budi@Example.COM ").expect("valid");
    /// assert_eq!(email.as_ref(), "budi@example.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, MemberValidationError> {
        let normalized = raw.as_ref().trim().to_lowercase();
        if normalized.is_empty()
            || normalized.chars().count() > EMAIL_MAX
            || !email_regex().is_match(&normalized)
        {
            return Err(MemberValidationError::InvalidEmail);
        }
        Ok(Self(normalized))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = MemberValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum accepted full-name length.
pub const FULL_NAME_MAX: usize = 120;

/// Member's legal or display name, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName(String);

impl FullName {
    /// Validate a full name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, MemberValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MemberValidationError::EmptyFullName);
        }
        if trimmed.chars().count() > FULL_NAME_MAX {
            return Err(MemberValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Length of a referral code.
pub const REFERRAL_CODE_LEN: usize = 8;

/// Code a member shares so new signups attach to them as sponsor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferralCode(String);

impl ReferralCode {
    /// Validate a referral code; input is upper-cased.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, MemberValidationError> {
        let normalized = raw.as_ref().trim().to_ascii_uppercase();
        if normalized.len() != REFERRAL_CODE_LEN
            || !normalized.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(MemberValidationError::InvalidReferralCode {
                len: REFERRAL_CODE_LEN,
            });
        }
        Ok(Self(normalized))
    }

    pub(crate) fn from_generated(code: String) -> Self {
        Self(code)
    }
}

impl AsRef<str> for ReferralCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public member number, `TPC` followed by six digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberCode(String);

impl MemberCode {
    /// Validate a member code.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, MemberValidationError> {
        let value = raw.as_ref().trim();
        let digits = value
            .strip_prefix("TPC")
            .ok_or(MemberValidationError::InvalidMemberCode)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(MemberValidationError::InvalidMemberCode);
        }
        Ok(Self(value.to_owned()))
    }

    /// Build a member code from the low six decimal digits of `number`.
    pub fn from_number(number: u32) -> Self {
        Self(format!("TPC{:06}", number % 1_000_000))
    }
}

impl AsRef<str> for MemberCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MemberCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access level of a profile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Regular presale participant.
    #[default]
    Member,
    /// Operator allowed to review invoices and withdrawals.
    Admin,
}

impl MemberRole {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for MemberRole {
    type Err = MemberValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            other => Err(MemberValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Persisted member profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Stable identifier.
    pub id: MemberId,
    /// Login and notification address.
    pub email: EmailAddress,
    /// Name shown in the dashboard and emails.
    pub full_name: FullName,
    /// Public member number.
    pub member_code: MemberCode,
    /// Code this member shares with their referrals.
    pub referral_code: ReferralCode,
    /// Member who referred this one, if any.
    pub sponsor_id: Option<MemberId>,
    /// Access level.
    pub role: MemberRole,
    /// Preferred language for the dashboard and emails.
    pub language: Language,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Signup time.
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Whether this profile may use admin endpoints.
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}

/// Referral entry shown to a sponsor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralSummary {
    /// Referred member.
    pub member_id: MemberId,
    /// Referred member's name.
    pub full_name: String,
    /// Referred member's public number.
    pub member_code: String,
    /// Signup time.
    pub joined_at: DateTime<Utc>,
}
