//! Rendering of domain errors for the two HTTP surfaces.
//!
//! `/api/v1` answers with the structured [`Error`] body and one status per
//! [`ErrorCode`]. `/functions/v1` keeps the `{ "error": message }` contract
//! its cron and back-office callers expect, where any server-side failure,
//! outages included, is a plain 500. Internal messages never leave the
//! process on either surface.

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for `/api/v1` handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Result alias for `/functions/v1` handlers.
pub type FunctionResult<T> = Result<T, FunctionError>;

const REDACTED_MESSAGE: &str = "Internal server error";

fn api_status(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn function_status(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ServiceUnavailable | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        client => api_status(client),
    }
}

/// Copy of `error` that is safe to show a caller.
///
/// Internal errors are logged in full and replaced by a fixed message; the
/// trace id survives so support can correlate the two.
fn client_view(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    error!(message = error.message(), trace_id = error.trace_id(), "internal error");
    let redacted = Error::internal(REDACTED_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        api_status(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        response.json(client_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}

/// Domain error bound for a `/functions/v1` response.
#[derive(Debug)]
pub struct FunctionError(Error);

impl From<Error> for FunctionError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// `{ "error": message }` failure body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FunctionErrorBody {
    pub error: String,
}

impl ResponseError for FunctionError {
    fn status_code(&self) -> StatusCode {
        function_status(self.0.code())
    }

    fn error_response(&self) -> HttpResponse {
        let visible = client_view(&self.0);
        HttpResponse::build(self.status_code()).json(FunctionErrorBody {
            error: visible.message().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests;
