//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration; handler DTOs point their enum
//! fields here with `#[schema(value_type = ...)]`.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The resource is in a state that does not allow the operation.
    #[schema(rename = "conflict")]
    Conflict,
    /// A dependency is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "amount is below the minimum purchase")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::InvoiceStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::InvoiceStatus)]
pub enum InvoiceStatusSchema {
    /// Awaiting payment.
    #[schema(rename = "UNPAID")]
    Unpaid,
    /// Proof submitted; waiting for an admin.
    #[schema(rename = "PENDING_REVIEW")]
    PendingReview,
    /// Payment confirmed.
    #[schema(rename = "PAID")]
    Paid,
    /// Cancelled by the member or an admin.
    #[schema(rename = "CANCELLED")]
    Cancelled,
    /// Payment window elapsed.
    #[schema(rename = "EXPIRED")]
    Expired,
}

/// OpenAPI schema for [`crate::domain::PaymentCurrency`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PaymentCurrency)]
pub enum PaymentCurrencySchema {
    /// USD Coin, amounts in cents.
    #[schema(rename = "USDC")]
    Usdc,
    /// Indonesian rupiah, whole rupiah.
    #[schema(rename = "IDR")]
    Idr,
}

/// OpenAPI schema for [`crate::domain::WithdrawalStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::WithdrawalStatus)]
pub enum WithdrawalStatusSchema {
    /// Awaiting an admin.
    #[schema(rename = "PENDING")]
    Pending,
    /// Tokens sent.
    #[schema(rename = "APPROVED")]
    Approved,
    /// Request declined.
    #[schema(rename = "REJECTED")]
    Rejected,
}

/// OpenAPI schema for [`crate::domain::ReviewDecision`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ReviewDecision)]
pub enum ReviewDecisionSchema {
    /// Approve the withdrawal.
    #[schema(rename = "approve")]
    Approve,
    /// Reject the withdrawal.
    #[schema(rename = "reject")]
    Reject,
}

/// OpenAPI schema for [`crate::domain::Language`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Language)]
pub enum LanguageSchema {
    /// English.
    #[schema(rename = "en")]
    En,
    /// Indonesian.
    #[schema(rename = "id")]
    Id,
}

/// OpenAPI schema for [`crate::domain::MemberRole`].
#[derive(ToSchema)]
#[schema(as = crate::domain::MemberRole)]
pub enum MemberRoleSchema {
    /// Regular member.
    #[schema(rename = "member")]
    Member,
    /// Operator with access to the admin routes.
    #[schema(rename = "admin")]
    Admin,
}

/// OpenAPI schema for [`crate::domain::InvoiceEmailKind`].
#[derive(ToSchema)]
#[schema(as = crate::domain::InvoiceEmailKind)]
pub enum InvoiceEmailKindSchema {
    /// Invoice issued.
    #[schema(rename = "created")]
    Created,
    /// Payment window elapsed.
    #[schema(rename = "expired")]
    Expired,
    /// Payment confirmed.
    #[schema(rename = "paid")]
    Paid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_uses_camel_case_trace_id() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"), "{schema_json}");
    }

    #[test]
    fn error_code_schema_variants_match_domain() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn invoice_status_schema_uses_storage_names() {
        let schema_json = schema_to_json::<InvoiceStatusSchema>();
        for status in crate::domain::InvoiceStatus::ALL {
            assert!(schema_json.contains(status.as_str()), "missing {status}");
        }
    }
}
