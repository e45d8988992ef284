//! Translations from driven-port errors to domain errors.
//!
//! Connection failures surface as `service_unavailable`; anything else a
//! repository reports is an internal error unless the variant carries a
//! client-visible meaning.

use super::Error;
use super::ports::{
    EmailSenderError, InvoiceRepositoryError, ProfileRepositoryError, WithdrawalRepositoryError,
};

pub(crate) fn map_invoice_repository_error(error: InvoiceRepositoryError) -> Error {
    match error {
        InvoiceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("invoice repository unavailable: {message}"))
        }
        InvoiceRepositoryError::Query { message } => {
            Error::internal(format!("invoice repository error: {message}"))
        }
        InvoiceRepositoryError::DuplicateNumber { number } => {
            Error::internal(format!("invoice number {number} collided"))
        }
    }
}

pub(crate) fn map_profile_repository_error(error: ProfileRepositoryError) -> Error {
    match error {
        ProfileRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("profile repository unavailable: {message}"))
        }
        ProfileRepositoryError::Query { message } => {
            Error::internal(format!("profile repository error: {message}"))
        }
        ProfileRepositoryError::DuplicateEmail => {
            Error::conflict("email address is already registered")
        }
        ProfileRepositoryError::DuplicateCode => {
            Error::internal("could not allocate a unique member code")
        }
    }
}

pub(crate) fn map_withdrawal_repository_error(error: WithdrawalRepositoryError) -> Error {
    match error {
        WithdrawalRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("withdrawal repository unavailable: {message}"))
        }
        WithdrawalRepositoryError::Query { message } => {
            Error::internal(format!("withdrawal repository error: {message}"))
        }
    }
}

pub(crate) fn map_email_sender_error(error: EmailSenderError) -> Error {
    match error {
        EmailSenderError::RateLimited { .. }
        | EmailSenderError::Timeout { .. }
        | EmailSenderError::Transport { .. } => Error::service_unavailable(error.to_string()),
        EmailSenderError::Rejected { .. } => Error::internal(error.to_string()),
    }
}
