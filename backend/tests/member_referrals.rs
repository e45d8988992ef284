//! Signup, login and referral scenarios through the HTTP routes.

#[allow(dead_code)]
#[path = "support/stack.rs"]
mod stack;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::json;

use stack::{Stack, log_in, send, sign_up};

#[rstest]
#[actix_rt::test]
async fn referral_codes_link_sponsors() {
    let stack = Stack::new();
    let app = actix_test::init_service(stack.app()).await;

    let (sponsor, sponsor_body) = sign_up(&app, "sponsor@example.com", None, "en").await;
    let code = sponsor_body["referralCode"].as_str().expect("code").to_lowercase();
    let (_, recruit_body) = sign_up(&app, "recruit@example.com", Some(&code), "id").await;
    assert_eq!(recruit_body["sponsorId"], sponsor_body["id"]);
    assert_eq!(recruit_body["language"], "id");

    let referrals = actix_test::TestRequest::get()
        .uri("/api/v1/me/referrals")
        .cookie(sponsor.clone())
        .to_request();
    let (status, body, _) = send(&app, referrals).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["memberCode"], recruit_body["memberCode"]);

    let dashboard = actix_test::TestRequest::get()
        .uri("/api/v1/me/dashboard")
        .cookie(sponsor)
        .to_request();
    let (_, body, _) = send(&app, dashboard).await;
    assert_eq!(body["referralCount"], 1);
}

#[rstest]
#[actix_rt::test]
async fn unknown_referral_codes_are_rejected() {
    let stack = Stack::new();
    let app = actix_test::init_service(stack.app()).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({
            "email": "nobody@example.com",
            "fullName": "No Body",
            "password": "correct-horse-1",
            "referralCode": "ZZZZZZZZ",
        }))
        .to_request();
    let (status, body, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[rstest]
#[actix_rt::test]
async fn duplicate_emails_conflict_case_insensitively() {
    let stack = Stack::new();
    let app = actix_test::init_service(stack.app()).await;
    sign_up(&app, "dupe@example.com", None, "en").await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({
            "email": "DUPE@example.com",
            "fullName": "Second Try",
            "password": "correct-horse-1",
        }))
        .to_request();
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[rstest]
#[actix_rt::test]
async fn login_checks_the_password_and_language_can_change() {
    let stack = Stack::new();
    let app = actix_test::init_service(stack.app()).await;
    sign_up(&app, "lang@example.com", None, "en").await;

    let wrong = actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "lang@example.com", "password": "wrong-password" }))
        .to_request();
    let (status, _, _) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let session = log_in(&app, "lang@example.com", "correct-horse-1").await;
    let change = actix_test::TestRequest::put()
        .uri("/api/v1/me/language")
        .cookie(session.clone())
        .set_json(json!({ "language": "id" }))
        .to_request();
    let (status, body, _) = send(&app, change).await;
    assert!(status.is_success(), "{status}: {body}");

    let me = actix_test::TestRequest::get()
        .uri("/api/v1/me")
        .cookie(session)
        .to_request();
    let (_, body, _) = send(&app, me).await;
    assert_eq!(body["language"], "id");
}
