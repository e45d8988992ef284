//! Member invoice handlers.
//!
//! ```text
//! POST /api/v1/invoices {"currency":"USDC","amount":10000}
//! GET /api/v1/invoices
//! GET /api/v1/invoices/{id}
//! POST /api/v1/invoices/{id}/proof {"proofUrl":"https://..."}
//! POST /api/v1/invoices/{id}/cancel
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateInvoiceRequest;
use crate::domain::{InvoiceId, PaymentCurrency};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{InvoiceResponse, collect};
use crate::inbound::http::schemas::{ErrorSchema, PaymentCurrencySchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_field, parse_uuid, require_field,
};

/// Request body for a new invoice.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceBody {
    #[schema(value_type = PaymentCurrencySchema)]
    pub currency: Option<String>,
    /// Minor units: cents for USDC, whole rupiah for IDR.
    #[schema(example = 10_000)]
    pub amount: Option<i64>,
}

/// Request body for a payment proof.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProofBody {
    #[schema(format = "uri")]
    pub proof_url: Option<String>,
}

pub(crate) fn parse_invoice_id(raw: &str) -> ApiResult<InvoiceId> {
    parse_uuid(raw, FieldName::new("invoiceId")).map(InvoiceId::from_uuid)
}

impl CreateInvoiceBody {
    fn into_request(self) -> ApiResult<CreateInvoiceRequest> {
        let raw = require_field(self.currency, FieldName::new("currency"))?;
        let currency = parse_field::<PaymentCurrency>(&raw, FieldName::new("currency"))?;
        let amount = self
            .amount
            .ok_or_else(|| missing_field_error(FieldName::new("amount")))?;
        Ok(CreateInvoiceRequest { currency, amount })
    }
}

/// Issue an invoice for a TPC purchase.
#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    request_body = CreateInvoiceBody,
    responses(
        (status = 201, description = "Invoice issued", body = InvoiceResponse),
        (status = 400, description = "Invalid amount or currency", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["invoices"],
    operation_id = "createInvoice"
)]
#[post("/invoices")]
pub async fn create_invoice(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateInvoiceBody>,
) -> ApiResult<HttpResponse> {
    let member = session.require_member()?;
    let request = payload.into_inner().into_request()?;
    let invoice = state.invoices.create_invoice(&member, request).await?;
    Ok(HttpResponse::Created().json(InvoiceResponse::from(invoice)))
}

/// The signed-in member's invoices, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    responses(
        (status = 200, description = "Invoices", body = [InvoiceResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["invoices"],
    operation_id = "listInvoices"
)]
#[get("/invoices")]
pub async fn list_invoices(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<InvoiceResponse>>> {
    let member = session.require_member()?;
    let invoices = state.invoice_query.list_member_invoices(&member).await?;
    Ok(web::Json(collect(invoices)))
}

/// One of the signed-in member's invoices.
#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    params(("id" = String, Path, format = "uuid", description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice", body = InvoiceResponse),
        (status = 404, description = "Not found or owned by another member", body = ErrorSchema)
    ),
    tags = ["invoices"],
    operation_id = "getInvoice"
)]
#[get("/invoices/{id}")]
pub async fn get_invoice(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<InvoiceResponse>> {
    let member = session.require_member()?;
    let id = parse_invoice_id(&path)?;
    let invoice = state.invoice_query.get_invoice(&member, &id).await?;
    Ok(web::Json(invoice.into()))
}

/// Attach a payment proof and hand the invoice to an admin.
#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/proof",
    params(("id" = String, Path, format = "uuid", description = "Invoice id")),
    request_body = ProofBody,
    responses(
        (status = 200, description = "Invoice awaiting review", body = InvoiceResponse),
        (status = 400, description = "Invalid proof URL", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Invoice not payable", body = ErrorSchema)
    ),
    tags = ["invoices"],
    operation_id = "submitProof"
)]
#[post("/invoices/{id}/proof")]
pub async fn submit_proof(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ProofBody>,
) -> ApiResult<web::Json<InvoiceResponse>> {
    let member = session.require_member()?;
    let id = parse_invoice_id(&path)?;
    let proof_url = require_field(payload.into_inner().proof_url, FieldName::new("proofUrl"))?;
    let invoice = state.invoices.submit_proof(&member, &id, proof_url).await?;
    Ok(web::Json(invoice.into()))
}

/// Cancel an unpaid invoice.
#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/cancel",
    params(("id" = String, Path, format = "uuid", description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice cancelled", body = InvoiceResponse),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Invoice no longer unpaid", body = ErrorSchema)
    ),
    tags = ["invoices"],
    operation_id = "cancelInvoice"
)]
#[post("/invoices/{id}/cancel")]
pub async fn cancel_invoice(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<InvoiceResponse>> {
    let member = session.require_member()?;
    let id = parse_invoice_id(&path)?;
    let invoice = state.invoices.cancel_invoice(&member, &id).await?;
    Ok(web::Json(invoice.into()))
}
