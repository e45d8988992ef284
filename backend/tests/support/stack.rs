//! In-memory service stack served through the real HTTP routes.
//!
//! Repositories, the email sender and the clock are shared handles, so a
//! test can drive the API and then inspect or mutate the underlying state.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use zeroize::Zeroizing;

use tpc_backend::domain::{
    EmailAddress, FullName, InvoiceExpiryService, InvoiceService, InvoiceServicePorts,
    InvoiceSettings, Language, Mailer, MemberCode, MemberId, MemberRole, MemberService,
    NotificationService, Profile, RandomCodeGenerator, ReferralCode, WithdrawalService,
    hash_password,
};
use tpc_backend::inbound::http::service_key::ServiceKey;
use tpc_backend::inbound::http::state::{HttpState, HttpStatePorts};
use tpc_backend::inbound::http::{configure_api, functions};
use tpc_backend::test_support::{
    InMemoryInvoiceRepository, InMemoryProfileRepository, InMemoryWithdrawalRepository,
    MutableClock, RecordingEmailSender,
};

pub const SERVICE_KEY: &str = "integration-service-key";
pub const ADMIN_EMAIL: &str = "admin@tpcglobal.io";
pub const ADMIN_PASSWORD: &str = "admin-password-1";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid start time")
}

pub struct Stack {
    pub profiles: InMemoryProfileRepository,
    pub invoices: InMemoryInvoiceRepository,
    pub withdrawals: InMemoryWithdrawalRepository,
    pub emails: RecordingEmailSender,
    pub clock: MutableClock,
    state: web::Data<HttpState>,
    key: Key,
}

impl Stack {
    pub fn new() -> Self {
        let profiles = InMemoryProfileRepository::default();
        let invoices = InMemoryInvoiceRepository::default();
        let withdrawals = InMemoryWithdrawalRepository::default();
        let emails = RecordingEmailSender::default();
        let clock = MutableClock::new(start_time());

        let mailer = Mailer::new(
            Arc::new(emails.clone()),
            EmailAddress::new(ADMIN_EMAIL).expect("admin email"),
        );
        let profiles_arc = Arc::new(profiles.clone());
        let invoices_arc = Arc::new(invoices.clone());
        let clock_arc = Arc::new(clock.clone());

        let members = Arc::new(MemberService::new(
            profiles_arc.clone(),
            invoices_arc.clone(),
            clock_arc.clone(),
            Arc::new(RandomCodeGenerator),
        ));
        let invoice_service = Arc::new(InvoiceService::new(
            InvoiceServicePorts {
                invoices: invoices_arc.clone(),
                profiles: profiles_arc.clone(),
                mailer: mailer.clone(),
                clock: clock_arc.clone(),
                codes: Arc::new(RandomCodeGenerator),
            },
            InvoiceSettings::default(),
        ));
        let withdrawal_service = Arc::new(WithdrawalService::new(
            Arc::new(withdrawals.clone()),
            profiles_arc.clone(),
            mailer.clone(),
            clock_arc.clone(),
        ));
        let expiry = Arc::new(InvoiceExpiryService::new(
            invoices_arc.clone(),
            profiles_arc.clone(),
            mailer.clone(),
            clock_arc,
        ));
        let notifications = Arc::new(NotificationService::new(invoices_arc, profiles_arc, mailer));

        let state = HttpState::new(
            HttpStatePorts {
                members: members.clone(),
                member_query: members,
                invoices: invoice_service.clone(),
                invoice_query: invoice_service,
                withdrawals: withdrawal_service.clone(),
                withdrawal_query: withdrawal_service,
                expiry,
                notifications,
            },
            ServiceKey::new(&Zeroizing::new(SERVICE_KEY.to_owned())),
        );

        Self {
            profiles,
            invoices,
            withdrawals,
            emails,
            clock,
            state: web::Data::new(state),
            key: Key::generate(),
        }
    }

    /// Seed the operator account used by admin scenarios.
    pub fn seed_admin(&self) -> MemberId {
        let id = MemberId::random();
        self.profiles.put(Profile {
            id,
            email: EmailAddress::new(ADMIN_EMAIL).expect("admin email"),
            full_name: FullName::new("TPC Operator").expect("name"),
            member_code: MemberCode::new("TPC000001").expect("member code"),
            referral_code: ReferralCode::new("ADMIN001").expect("referral code"),
            sponsor_id: None,
            role: MemberRole::Admin,
            language: Language::En,
            password_hash: hash_password(ADMIN_PASSWORD).expect("hash"),
            created_at: start_time(),
        });
        id
    }

    /// Build the routed app; the result owns its handles and outlives `self`.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .build();
        App::new()
            .app_data(self.state.clone())
            .service(web::scope("/api/v1").wrap(session).configure(configure_api))
            .configure(functions::configure)
    }
}

/// Send a request and decode the JSON body, if any.
pub async fn send<S>(app: &S, req: actix_http::Request) -> (StatusCode, Value, Option<Cookie<'static>>)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = actix_test::call_service(app, req).await;
    let status = res.status();
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned);
    let bytes = actix_test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body, cookie)
}

/// Sign up a member and return their session cookie and profile body.
pub async fn sign_up<S>(
    app: &S,
    email: &str,
    referral_code: Option<&str>,
    language: &str,
) -> (Cookie<'static>, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(serde_json::json!({
            "email": email,
            "fullName": "Budi Santoso",
            "password": "correct-horse-1",
            "referralCode": referral_code,
            "language": language,
        }))
        .to_request();
    let (status, body, cookie) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    (cookie.expect("signup sets a session"), body)
}

/// Log in and return the session cookie.
pub async fn log_in<S>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(serde_json::json!({ "email": email, "password": password }))
        .to_request();
    let (status, body, cookie) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    cookie.expect("login sets a session")
}
