//! Serverless-style function routes called by cron jobs and the back office.
//!
//! ```text
//! POST /functions/v1/expire-invoices
//! POST /functions/v1/send-invoice-email {"invoiceId":"...","kind":"created"}
//! POST /functions/v1/notify-admin {"subject":"...","message":"..."}
//! ```
//!
//! Every route requires `Authorization: Bearer <service key>`. Success bodies
//! carry `"success": true`; failures use the `{ "error": message }` envelope
//! rather than the API error schema.

use actix_web::{HttpRequest, post, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::{Error, InvoiceEmailKind, InvoiceId};
pub use crate::inbound::http::error::{FunctionError, FunctionErrorBody, FunctionResult};
use crate::inbound::http::schemas::InvoiceEmailKindSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_field, parse_uuid, require_field};

fn authorize(state: &HttpState, req: &HttpRequest) -> FunctionResult<()> {
    let allowed = state
        .service_key
        .as_ref()
        .is_some_and(|key| key.authorizes(req));
    if allowed {
        Ok(())
    } else {
        warn!(path = req.path(), "function call without a valid service key");
        Err(Error::unauthorized("invalid service key").into())
    }
}

/// Result of an expiry sweep.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpireInvoicesResponse {
    pub success: bool,
    pub expired: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
}

/// Generic success body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Request body for re-sending an invoice email.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendInvoiceEmailBody {
    #[schema(format = "uuid")]
    pub invoice_id: Option<String>,
    #[schema(value_type = InvoiceEmailKindSchema)]
    pub kind: Option<String>,
}

/// Request body for a free-form admin notice.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct NotifyAdminBody {
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// Expire overdue unpaid invoices and email their owners.
#[utoipa::path(
    post,
    path = "/functions/v1/expire-invoices",
    responses(
        (status = 200, description = "Sweep finished", body = ExpireInvoicesResponse),
        (status = 401, description = "Invalid service key", body = FunctionErrorBody),
        (status = 500, description = "Sweep failed or database unavailable", body = FunctionErrorBody)
    ),
    tags = ["functions"],
    operation_id = "expireInvoices",
    security(("ServiceKey" = []))
)]
#[post("/expire-invoices")]
pub async fn expire_invoices(
    state: web::Data<HttpState>,
    req: HttpRequest,
) -> FunctionResult<web::Json<ExpireInvoicesResponse>> {
    authorize(&state, &req)?;
    let report = state.expiry.run_sweep().await?;
    info!(
        expired = report.expired,
        emails_sent = report.emails_sent,
        emails_failed = report.emails_failed,
        "expiry sweep triggered over http"
    );
    Ok(web::Json(ExpireInvoicesResponse {
        success: true,
        expired: report.expired,
        emails_sent: report.emails_sent,
        emails_failed: report.emails_failed,
    }))
}

/// Send one of the member-facing invoice emails.
#[utoipa::path(
    post,
    path = "/functions/v1/send-invoice-email",
    request_body = SendInvoiceEmailBody,
    responses(
        (status = 200, description = "Email accepted by the provider", body = SuccessResponse),
        (status = 400, description = "Invalid body", body = FunctionErrorBody),
        (status = 401, description = "Invalid service key", body = FunctionErrorBody),
        (status = 404, description = "Invoice not found", body = FunctionErrorBody),
        (status = 500, description = "Email provider unavailable", body = FunctionErrorBody)
    ),
    tags = ["functions"],
    operation_id = "sendInvoiceEmail",
    security(("ServiceKey" = []))
)]
#[post("/send-invoice-email")]
pub async fn send_invoice_email(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<SendInvoiceEmailBody>,
) -> FunctionResult<web::Json<SuccessResponse>> {
    authorize(&state, &req)?;
    let SendInvoiceEmailBody { invoice_id, kind } = payload.into_inner();
    let raw_id = require_field(invoice_id, FieldName::new("invoiceId"))?;
    let invoice = InvoiceId::from_uuid(parse_uuid(&raw_id, FieldName::new("invoiceId"))?);
    let raw_kind = require_field(kind, FieldName::new("kind"))?;
    let kind = parse_field::<InvoiceEmailKind>(&raw_kind, FieldName::new("kind"))?;
    state.notifications.send_invoice_email(&invoice, kind).await?;
    Ok(web::Json(SuccessResponse { success: true }))
}

/// Email the configured admin address.
#[utoipa::path(
    post,
    path = "/functions/v1/notify-admin",
    request_body = NotifyAdminBody,
    responses(
        (status = 200, description = "Email accepted by the provider", body = SuccessResponse),
        (status = 400, description = "Subject or message missing", body = FunctionErrorBody),
        (status = 401, description = "Invalid service key", body = FunctionErrorBody),
        (status = 500, description = "Email provider unavailable", body = FunctionErrorBody)
    ),
    tags = ["functions"],
    operation_id = "notifyAdmin",
    security(("ServiceKey" = []))
)]
#[post("/notify-admin")]
pub async fn notify_admin(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<NotifyAdminBody>,
) -> FunctionResult<web::Json<SuccessResponse>> {
    authorize(&state, &req)?;
    let NotifyAdminBody { subject, message } = payload.into_inner();
    let subject = require_field(subject, FieldName::new("subject"))?;
    let message = require_field(message, FieldName::new("message"))?;
    state.notifications.notify_admin(&subject, &message).await?;
    Ok(web::Json(SuccessResponse { success: true }))
}

/// Register the function routes under `/functions/v1`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/functions/v1")
            .service(expire_invoices)
            .service(send_invoice_email)
            .service(notify_admin),
    );
}
