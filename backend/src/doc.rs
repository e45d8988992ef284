//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer together
//! with the schema wrappers from [`crate::inbound::http::schemas`], so domain
//! types stay free of utoipa derives. Two security schemes are declared: the
//! session cookie for `/api/v1` and the bearer service key for
//! `/functions/v1`.
//!
//! The document backs Swagger UI in debug builds and is exported with
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::admin::ReviewBody;
use crate::inbound::http::dto::{
    DashboardResponse, InvoiceCountsResponse, InvoiceResponse, ProfileResponse, ReferralResponse,
    WithdrawalResponse,
};
use crate::inbound::http::functions::{
    ExpireInvoicesResponse, FunctionErrorBody, NotifyAdminBody, SendInvoiceEmailBody,
    SuccessResponse,
};
use crate::inbound::http::invoices::{CreateInvoiceBody, ProofBody};
use crate::inbound::http::members::{LanguageRequest, LoginRequest, SignupRequest};
use crate::inbound::http::paths::NormalizedPathResponse;
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, InvoiceEmailKindSchema, InvoiceStatusSchema, LanguageSchema,
    MemberRoleSchema, PaymentCurrencySchema, ReviewDecisionSchema, WithdrawalStatusSchema,
};
use crate::inbound::http::withdrawals::WithdrawalBody;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with both security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
        components.add_security_scheme(
            "ServiceKey",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Shared key for /functions/v1 callers."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "TPC Global backend API",
        description = "Member accounts, TPC purchase invoices, withdrawals and operator functions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::members::signup,
        crate::inbound::http::members::login,
        crate::inbound::http::members::logout,
        crate::inbound::http::members::current_profile,
        crate::inbound::http::members::update_language,
        crate::inbound::http::members::list_referrals,
        crate::inbound::http::members::dashboard,
        crate::inbound::http::invoices::create_invoice,
        crate::inbound::http::invoices::list_invoices,
        crate::inbound::http::invoices::get_invoice,
        crate::inbound::http::invoices::submit_proof,
        crate::inbound::http::invoices::cancel_invoice,
        crate::inbound::http::withdrawals::request_withdrawal,
        crate::inbound::http::withdrawals::list_withdrawals,
        crate::inbound::http::admin::list_invoices,
        crate::inbound::http::admin::approve_invoice,
        crate::inbound::http::admin::reject_invoice,
        crate::inbound::http::admin::cancel_invoice,
        crate::inbound::http::admin::list_withdrawals,
        crate::inbound::http::admin::review_withdrawal,
        crate::inbound::http::functions::expire_invoices,
        crate::inbound::http::functions::send_invoice_email,
        crate::inbound::http::functions::notify_admin,
        crate::inbound::http::paths::normalize,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        InvoiceStatusSchema,
        PaymentCurrencySchema,
        WithdrawalStatusSchema,
        ReviewDecisionSchema,
        LanguageSchema,
        MemberRoleSchema,
        InvoiceEmailKindSchema,
        SignupRequest,
        LoginRequest,
        LanguageRequest,
        CreateInvoiceBody,
        ProofBody,
        WithdrawalBody,
        ReviewBody,
        ProfileResponse,
        ReferralResponse,
        InvoiceCountsResponse,
        DashboardResponse,
        InvoiceResponse,
        WithdrawalResponse,
        ExpireInvoicesResponse,
        SuccessResponse,
        SendInvoiceEmailBody,
        NotifyAdminBody,
        FunctionErrorBody,
        NormalizedPathResponse,
    )),
    tags(
        (name = "members", description = "Signup, login and member self-service"),
        (name = "invoices", description = "TPC purchase invoices"),
        (name = "withdrawals", description = "Payout requests"),
        (name = "admin", description = "Back-office review"),
        (name = "functions", description = "Service-key protected jobs"),
        (name = "paths", description = "Public path helpers"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
