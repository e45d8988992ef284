//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use serde_json::json;
use uuid::Uuid;

use crate::domain::{AuthValidationError, Error, MemberValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a string field through its [`FromStr`] implementation, reporting the
/// parse error message against `field`.
pub(crate) fn parse_field<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|error| {
        ValidationError::new(field.as_str(), error.to_string())
            .with_value(ErrorCode::InvalidValue, value)
    })
}

/// Require an optional body field to be present and non-blank.
pub(crate) fn require_field(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Map signup and login validation failures onto the offending field.
pub(crate) fn map_auth_validation_error(error: AuthValidationError) -> Error {
    let field = match &error {
        AuthValidationError::EmptyPassword | AuthValidationError::PasswordTooShort { .. } => {
            "password"
        }
        AuthValidationError::Member(member) => match member {
            MemberValidationError::InvalidEmail => "email",
            MemberValidationError::EmptyFullName | MemberValidationError::FullNameTooLong { .. } => {
                "fullName"
            }
            MemberValidationError::InvalidReferralCode { .. } => "referralCode",
            MemberValidationError::InvalidMemberCode | MemberValidationError::UnknownRole(_) => {
                "member"
            }
        },
    };
    ValidationError::new(field, error.to_string()).with_code(ErrorCode::InvalidValue)
}
