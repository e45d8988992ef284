//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test as actix_test, web};
use zeroize::Zeroizing;

use crate::domain::ports::{
    MockInvoiceCommand, MockInvoiceExpirySweep, MockInvoiceQuery, MockMemberAccount,
    MockMemberQuery, MockNotificationCommand, MockWithdrawalCommand, MockWithdrawalQuery,
};
use crate::domain::test_fixtures::sample_profile;
use crate::domain::{Error, Language, MemberId, MemberRole, Profile};

use super::service_key::ServiceKey;
use super::session::SessionContext;
use super::state::{HttpState, HttpStatePorts};

/// Key accepted by [`MockPorts::into_state`] on the function routes.
pub const TEST_SERVICE_KEY: &str = "test-service-key";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mocked driving ports; a handler touching a port without an expectation
/// fails the test.
#[derive(Default)]
pub struct MockPorts {
    pub members: MockMemberAccount,
    pub member_query: MockMemberQuery,
    pub invoices: MockInvoiceCommand,
    pub invoice_query: MockInvoiceQuery,
    pub withdrawals: MockWithdrawalCommand,
    pub withdrawal_query: MockWithdrawalQuery,
    pub expiry: MockInvoiceExpirySweep,
    pub notifications: MockNotificationCommand,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        let key = ServiceKey::new(&Zeroizing::new(TEST_SERVICE_KEY.to_owned()));
        HttpState::new(
            HttpStatePorts {
                members: Arc::new(self.members),
                member_query: Arc::new(self.member_query),
                invoices: Arc::new(self.invoices),
                invoice_query: Arc::new(self.invoice_query),
                withdrawals: Arc::new(self.withdrawals),
                withdrawal_query: Arc::new(self.withdrawal_query),
                expiry: Arc::new(self.expiry),
                notifications: Arc::new(self.notifications),
            },
            key,
        )
    }

    /// Answer profile lookups for `member` with the given role.
    pub fn with_profile(mut self, member: MemberId, role: MemberRole) -> Self {
        self.member_query
            .expect_get_profile()
            .withf(move |id| *id == member)
            .returning(move |_| Ok(profile_for(member, role)));
        self
    }
}

pub fn profile_for(member: MemberId, role: MemberRole) -> Profile {
    let mut profile = sample_profile(Language::Id);
    profile.id = member;
    profile.role = role;
    profile
}

async fn sign_in(session: SessionContext, path: web::Path<String>) -> Result<HttpResponse, Error> {
    let member: MemberId = path
        .into_inner()
        .parse()
        .map_err(|_| Error::invalid_request("bad member id"))?;
    session.persist_member(&member)?;
    Ok(HttpResponse::NoContent().finish())
}

/// App with state, test sessions and a `/test/sign-in/{id}` helper route.
pub fn test_app<F>(
    state: HttpState,
    routes: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig),
{
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .route("/test/sign-in/{id}", web::post().to(sign_in))
        .configure(routes)
}

/// Sign `member` in through the helper route and return the session cookie.
pub async fn session_cookie<S>(app: &S, member: MemberId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = actix_test::TestRequest::post()
        .uri(&format!("/test/sign-in/{member}"))
        .to_request();
    let res = actix_test::call_service(app, req).await;
    assert!(res.status().is_success(), "sign-in helper failed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
