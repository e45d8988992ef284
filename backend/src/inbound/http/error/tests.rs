//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::rstest;
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("already paid"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn body_of(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("body bytes");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, header, value)
}

#[actix_web::test]
async fn internal_errors_are_redacted() {
    let error = Error::internal("connection string leaked")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "secret": "x" }));

    let (status, header, body) = body_of(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(body["code"], "internal_error");
    assert_eq!(body["traceId"], TRACE_ID);
    assert!(body.get("details").is_none());
}

#[actix_web::test]
async fn client_errors_keep_message_and_details() {
    let error = Error::conflict("invoice is no longer unpaid")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "status": "PAID" }));

    let (status, header, body) = body_of(&error).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body["message"], "invoice is no longer unpaid");
    assert_eq!(body["details"]["status"], "PAID");
}

#[actix_web::test]
async fn errors_without_trace_id_omit_the_header() {
    let (_, header, body) = body_of(&Error::not_found("missing")).await;
    assert!(header.is_none());
    assert!(body.get("traceId").is_none());
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("invalid service key"), StatusCode::UNAUTHORIZED)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::service_unavailable("db down"), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn function_routes_report_outages_as_server_errors(
    #[case] err: Error,
    #[case] status: StatusCode,
) {
    assert_eq!(ResponseError::status_code(&FunctionError::from(err)), status);
}

#[actix_web::test]
async fn function_envelope_carries_only_the_public_message() {
    let failure = FunctionError::from(Error::internal("password=hunter2").with_trace_id(TRACE_ID));

    let response = ResponseError::error_response(&failure);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = to_bytes(response.into_body()).await.expect("body bytes");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body, json!({ "error": "Internal server error" }));
}
