//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities for members, invoices and
//! withdrawals, the services that change them, and the ports those services
//! drive. Nothing in this module knows about HTTP or SQL.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Profile, Invoice, Withdrawal: the persisted aggregates.
//! - InvoiceService, InvoiceExpiryService, MemberService, WithdrawalService,
//!   NotificationService: driving port implementations.

pub mod auth;
pub mod codes;
pub mod error;
pub mod invoice;
mod invoice_expiry;
mod invoice_service;
pub mod language;
pub mod member;
mod member_service;
pub mod notification;
mod notification_service;
mod port_error_mapping;
pub mod ports;
pub mod public_path;
pub mod trace_id;
pub mod withdrawal;
mod withdrawal_service;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::auth::{
    AuthValidationError, LoginCredentials, PASSWORD_MIN, PasswordHashError, SignupDetails,
    hash_password, verify_password,
};
pub use self::codes::{CodeGenerator, RandomCodeGenerator};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::invoice::{
    InvalidInvoiceNumber, InvalidProofUrl, Invoice, InvoiceAction, InvoiceDraft, InvoiceId,
    InvoiceNumber, InvoiceStatus, InvoiceTransitionError, PaymentCurrency, PricingConfig,
    PricingError, ProofUrl, Quote, UnknownCurrency, UnknownInvoiceStatus,
};
pub use self::invoice_expiry::{InvoiceExpiryService, spawn_expiry_schedule};
pub use self::invoice_service::{InvoiceService, InvoiceServicePorts, InvoiceSettings};
pub use self::language::{Language, UnsupportedLanguage};
pub use self::member::{
    EMAIL_MAX, EmailAddress, FULL_NAME_MAX, FullName, MemberCode, MemberId, MemberRole,
    MemberValidationError, Profile, REFERRAL_CODE_LEN, ReferralCode, ReferralSummary,
};
pub use self::member_service::MemberService;
pub use self::notification::{EmailMessage, InvoiceEmailKind, UnknownEmailKind, escape_html};
pub use self::notification_service::{Mailer, NotificationService};
pub use self::public_path::{NormalizedPath, PUBLIC_ROUTE_SLUGS, needs_redirect, normalize_public_path};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::withdrawal::{
    AlreadyReviewed, REVIEW_NOTE_MAX, ReviewDecision, UnknownDecision, UnknownWithdrawalStatus,
    WALLET_ADDRESS_MAX, WALLET_ADDRESS_MIN, WalletAddress, Withdrawal, WithdrawalId,
    WithdrawalStatus, WithdrawalValidationError, normalize_note,
};
pub use self::withdrawal_service::WithdrawalService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use tpc_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
