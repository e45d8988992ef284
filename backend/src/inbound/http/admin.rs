//! Admin review handlers.
//!
//! ```text
//! GET /api/v1/admin/invoices?status=PENDING_REVIEW
//! POST /api/v1/admin/invoices/{id}/approve
//! POST /api/v1/admin/invoices/{id}/reject
//! POST /api/v1/admin/invoices/{id}/cancel
//! GET /api/v1/admin/withdrawals?status=PENDING
//! POST /api/v1/admin/withdrawals/{id}/review {"decision":"approve","note":"sent"}
//! ```
//!
//! Every handler re-reads the caller's profile through
//! [`require_admin`] before touching a port.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{InvoiceStatus, ReviewDecision, WithdrawalId, WithdrawalStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::dto::{InvoiceResponse, WithdrawalResponse, collect};
use crate::inbound::http::invoices::parse_invoice_id;
use crate::inbound::http::schemas::{ErrorSchema, ReviewDecisionSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_field, parse_uuid, require_field};

/// Optional status filter for admin listings.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusFilter {
    /// Storage name of the status, e.g. `PENDING_REVIEW`.
    pub status: Option<String>,
}

impl StatusFilter {
    fn parse<T>(&self) -> ApiResult<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.status
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_field::<T>(raw, FieldName::new("status")))
            .transpose()
    }
}

/// Admin decision on a withdrawal.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    #[schema(value_type = ReviewDecisionSchema)]
    pub decision: Option<String>,
    pub note: Option<String>,
}

fn parse_decision(raw: Option<String>) -> ApiResult<ReviewDecision> {
    let raw = require_field(raw, FieldName::new("decision"))?;
    parse_field(&raw, FieldName::new("decision"))
}

/// All invoices, optionally filtered by status.
#[utoipa::path(
    get,
    path = "/api/v1/admin/invoices",
    params(StatusFilter),
    responses(
        (status = 200, description = "Invoices, newest first", body = [InvoiceResponse]),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListInvoices"
)]
#[get("/admin/invoices")]
pub async fn list_invoices(
    state: web::Data<HttpState>,
    session: SessionContext,
    filter: web::Query<StatusFilter>,
) -> ApiResult<web::Json<Vec<InvoiceResponse>>> {
    require_admin(&session, state.member_query.as_ref()).await?;
    let status = filter.parse::<InvoiceStatus>()?;
    let invoices = state.invoice_query.admin_list_invoices(status).await?;
    Ok(web::Json(collect(invoices)))
}

/// Confirm payment of an invoice under review.
#[utoipa::path(
    post,
    path = "/api/v1/admin/invoices/{id}/approve",
    params(("id" = String, Path, format = "uuid", description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice paid", body = InvoiceResponse),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 409, description = "Invoice not under review", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminApproveInvoice"
)]
#[post("/admin/invoices/{id}/approve")]
pub async fn approve_invoice(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<InvoiceResponse>> {
    let admin = require_admin(&session, state.member_query.as_ref()).await?;
    let id = parse_invoice_id(&path)?;
    let invoice = state.invoices.admin_approve(&admin, &id).await?;
    Ok(web::Json(invoice.into()))
}

/// Reject the proof on an invoice under review.
#[utoipa::path(
    post,
    path = "/api/v1/admin/invoices/{id}/reject",
    params(("id" = String, Path, format = "uuid", description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice cancelled", body = InvoiceResponse),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 409, description = "Invoice not under review", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminRejectInvoice"
)]
#[post("/admin/invoices/{id}/reject")]
pub async fn reject_invoice(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<InvoiceResponse>> {
    let admin = require_admin(&session, state.member_query.as_ref()).await?;
    let id = parse_invoice_id(&path)?;
    let invoice = state.invoices.admin_reject(&admin, &id).await?;
    Ok(web::Json(invoice.into()))
}

/// Cancel an unpaid invoice on the member's behalf.
#[utoipa::path(
    post,
    path = "/api/v1/admin/invoices/{id}/cancel",
    params(("id" = String, Path, format = "uuid", description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice cancelled", body = InvoiceResponse),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 409, description = "Invoice no longer unpaid", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminCancelInvoice"
)]
#[post("/admin/invoices/{id}/cancel")]
pub async fn cancel_invoice(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<InvoiceResponse>> {
    let admin = require_admin(&session, state.member_query.as_ref()).await?;
    let id = parse_invoice_id(&path)?;
    let invoice = state.invoices.admin_cancel(&admin, &id).await?;
    Ok(web::Json(invoice.into()))
}

/// All withdrawals, optionally filtered by status.
#[utoipa::path(
    get,
    path = "/api/v1/admin/withdrawals",
    params(StatusFilter),
    responses(
        (status = 200, description = "Withdrawals, newest first", body = [WithdrawalResponse]),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListWithdrawals"
)]
#[get("/admin/withdrawals")]
pub async fn list_withdrawals(
    state: web::Data<HttpState>,
    session: SessionContext,
    filter: web::Query<StatusFilter>,
) -> ApiResult<web::Json<Vec<WithdrawalResponse>>> {
    require_admin(&session, state.member_query.as_ref()).await?;
    let status = filter.parse::<WithdrawalStatus>()?;
    let withdrawals = state.withdrawal_query.admin_list_withdrawals(status).await?;
    Ok(web::Json(collect(withdrawals)))
}

/// Approve or reject a pending withdrawal.
#[utoipa::path(
    post,
    path = "/api/v1/admin/withdrawals/{id}/review",
    params(("id" = String, Path, format = "uuid", description = "Withdrawal id")),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Withdrawal reviewed", body = WithdrawalResponse),
        (status = 400, description = "Invalid decision or note", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 409, description = "Already reviewed", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminReviewWithdrawal"
)]
#[post("/admin/withdrawals/{id}/review")]
pub async fn review_withdrawal(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReviewBody>,
) -> ApiResult<web::Json<WithdrawalResponse>> {
    let admin = require_admin(&session, state.member_query.as_ref()).await?;
    let id = WithdrawalId::from_uuid(parse_uuid(&path, FieldName::new("withdrawalId"))?);
    let ReviewBody { decision, note } = payload.into_inner();
    let decision = parse_decision(decision)?;
    let withdrawal = state
        .withdrawals
        .admin_review(&admin, &id, decision, note)
        .await?;
    Ok(web::Json(withdrawal.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{fixture_timestamp, sample_invoice};
    use crate::domain::{Error, MemberId, MemberRole, WalletAddress, Withdrawal};
    use crate::inbound::http::test_utils::{MockPorts, session_cookie, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope("/api/v1")
                .service(list_invoices)
                .service(approve_invoice)
                .service(reject_invoice)
                .service(cancel_invoice)
                .service(list_withdrawals)
                .service(review_withdrawal),
        );
    }

    #[actix_web::test]
    async fn members_cannot_list_invoices() {
        let member = MemberId::random();
        let ports = MockPorts::default().with_profile(member, MemberRole::Member);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, member).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/invoices")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[case("/api/v1/admin/invoices?status=pending_review", Some(InvoiceStatus::PendingReview))]
    #[case("/api/v1/admin/invoices", None)]
    #[case("/api/v1/admin/invoices?status=", None)]
    #[actix_web::test]
    async fn invoice_listing_parses_the_filter(
        #[case] uri: &str,
        #[case] expected: Option<InvoiceStatus>,
    ) {
        let admin = MemberId::random();
        let mut ports = MockPorts::default().with_profile(admin, MemberRole::Admin);
        ports
            .invoice_query
            .expect_admin_list_invoices()
            .withf(move |status| *status == expected)
            .returning(|_| Ok(vec![sample_invoice(MemberId::random())]));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, admin).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn unknown_status_filter_is_rejected() {
        let admin = MemberId::random();
        let ports = MockPorts::default().with_profile(admin, MemberRole::Admin);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, admin).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/withdrawals?status=LOST")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "status");
    }

    #[actix_web::test]
    async fn approve_passes_the_admin_id() {
        let admin = MemberId::random();
        let mut paid = sample_invoice(MemberId::random());
        paid.status = InvoiceStatus::Paid;
        paid.paid_at = Some(fixture_timestamp());
        paid.reviewed_by = Some(admin);
        let id = paid.id;
        let mut ports = MockPorts::default().with_profile(admin, MemberRole::Admin);
        ports
            .invoices
            .expect_admin_approve()
            .withf(move |by, invoice| *by == admin && *invoice == id)
            .return_once(move |_, _| Ok(paid));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, admin).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/admin/invoices/{id}/approve"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["status"], "PAID");
        assert_eq!(body["reviewedBy"], admin.to_string());
    }

    #[actix_web::test]
    async fn reject_conflict_surfaces_as_409() {
        let admin = MemberId::random();
        let mut ports = MockPorts::default().with_profile(admin, MemberRole::Admin);
        ports
            .invoices
            .expect_admin_reject()
            .returning(|_, _| Err(Error::conflict("invoice is not awaiting review")));
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, admin).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!(
                    "/api/v1/admin/invoices/{}/reject",
                    sample_invoice(admin).id
                ))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[case("Approve", ReviewDecision::Approve)]
    #[case("reject", ReviewDecision::Reject)]
    #[actix_web::test]
    async fn review_parses_the_decision(#[case] raw: &str, #[case] expected: ReviewDecision) {
        let admin = MemberId::random();
        let mut ports = MockPorts::default().with_profile(admin, MemberRole::Admin);
        ports
            .withdrawals
            .expect_admin_review()
            .withf(move |_, _, decision, note| {
                *decision == expected && note.as_deref() == Some("checked")
            })
            .returning(|_, _, decision, note| {
                let mut withdrawal = Withdrawal::request(
                    MemberId::random(),
                    10,
                    WalletAddress::new("0x52908400098527886E0F7030069857D2E4169EE7")
                        .expect("valid wallet"),
                    fixture_timestamp(),
                )
                .expect("valid withdrawal");
                withdrawal
                    .review(decision, note, fixture_timestamp())
                    .expect("pending");
                Ok(withdrawal)
            });
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, admin).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!(
                    "/api/v1/admin/withdrawals/{}/review",
                    WithdrawalId::random()
                ))
                .cookie(cookie)
                .set_json(json!({"decision": raw, "note": "checked"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["note"], "checked");
    }

    #[actix_web::test]
    async fn review_rejects_unknown_decisions() {
        let admin = MemberId::random();
        let ports = MockPorts::default().with_profile(admin, MemberRole::Admin);
        let app = actix_test::init_service(test_app(ports.into_state(), routes)).await;
        let cookie = session_cookie(&app, admin).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!(
                    "/api/v1/admin/withdrawals/{}/review",
                    WithdrawalId::random()
                ))
                .cookie(cookie)
                .set_json(json!({"decision": "maybe"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "decision");
        assert_eq!(body["details"]["value"], "maybe");
    }
}
