//! Authentication primitives: login credentials, signup details and password
//! hashing.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use zeroize::Zeroizing;

use super::{EmailAddress, FullName, Language, MemberValidationError, ReferralCode};

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    /// Email or name failed validation.
    #[error(transparent)]
    Member(#[from] MemberValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password is shorter than [`PASSWORD_MIN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is normalised by [`EmailAddress`].
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace.
///
/// # Examples
/// ```
/// use tpc_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Budi@Example.com", "password").unwrap();
/// assert_eq!(creds.email().as_ref(), "budi@example.com");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for profile lookups.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated signup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupDetails {
    email: EmailAddress,
    full_name: FullName,
    password: Zeroizing<String>,
    referral_code: Option<ReferralCode>,
    language: Language,
}

impl SignupDetails {
    /// Validate raw signup inputs.
    ///
    /// A blank referral code is treated as absent.
    pub fn try_from_parts(
        email: &str,
        full_name: &str,
        password: &str,
        referral_code: Option<&str>,
        language: Language,
    ) -> Result<Self, AuthValidationError> {
        let email = EmailAddress::new(email)?;
        let full_name = FullName::new(full_name)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(AuthValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let referral_code = referral_code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(ReferralCode::new)
            .transpose()?;
        Ok(Self {
            email,
            full_name,
            password: Zeroizing::new(password.to_owned()),
            referral_code,
            language,
        })
    }

    /// Login address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Member name.
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Plain-text password to hash.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Sponsor's referral code, when one was entered.
    pub fn referral_code(&self) -> Option<&ReferralCode> {
        self.referral_code.as_ref()
    }

    /// Preferred language.
    pub fn language(&self) -> Language {
        self.language
    }
}

/// Failure while hashing or verifying a password.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Hash `password` with Argon2id and a random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError {
            message: err.to_string(),
        })
}

/// Check `password` against a stored PHC string.
///
/// A malformed stored hash is reported as an error rather than a mismatch.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordHashError> {
    let parsed = PasswordHash::new(stored).map_err(|err| PasswordHashError {
        message: err.to_string(),
    })?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHashError {
            message: err.to_string(),
        }),
    }
}
