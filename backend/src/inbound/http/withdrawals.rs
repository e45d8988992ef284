//! Member withdrawal handlers.
//!
//! ```text
//! POST /api/v1/withdrawals {"tpcAmount":500,"walletAddress":"0x..."}
//! GET /api/v1/withdrawals
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::WithdrawalRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{WithdrawalResponse, collect};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, require_field};

/// Request body for a withdrawal.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalBody {
    pub tpc_amount: Option<i64>,
    pub wallet_address: Option<String>,
}

/// Ask for TPC to be sent to an external wallet.
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals",
    request_body = WithdrawalBody,
    responses(
        (status = 201, description = "Withdrawal pending review", body = WithdrawalResponse),
        (status = 400, description = "Invalid amount or wallet", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["withdrawals"],
    operation_id = "requestWithdrawal"
)]
#[post("/withdrawals")]
pub async fn request_withdrawal(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<WithdrawalBody>,
) -> ApiResult<HttpResponse> {
    let member = session.require_member()?;
    let WithdrawalBody {
        tpc_amount,
        wallet_address,
    } = payload.into_inner();
    let tpc_amount = tpc_amount.ok_or_else(|| missing_field_error(FieldName::new("tpcAmount")))?;
    let wallet_address = require_field(wallet_address, FieldName::new("walletAddress"))?;
    let withdrawal = state
        .withdrawals
        .request_withdrawal(
            &member,
            WithdrawalRequest {
                tpc_amount,
                wallet_address,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(WithdrawalResponse::from(withdrawal)))
}

/// The signed-in member's withdrawals, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/withdrawals",
    responses(
        (status = 200, description = "Withdrawals", body = [WithdrawalResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["withdrawals"],
    operation_id = "listWithdrawals"
)]
#[get("/withdrawals")]
pub async fn list_withdrawals(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<WithdrawalResponse>>> {
    let member = session.require_member()?;
    let withdrawals = state.withdrawal_query.list_member_withdrawals(&member).await?;
    Ok(web::Json(collect(withdrawals)))
}
