//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{ServiceDeps, build_http_ports};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use tpc_backend::Trace;
#[cfg(debug_assertions)]
use tpc_backend::doc::ApiDoc;
use tpc_backend::domain::spawn_expiry_schedule;
use tpc_backend::inbound::http::health::{HealthState, live, ready};
use tpc_backend::inbound::http::service_key::ServiceKey;
use tpc_backend::inbound::http::state::HttpState;
use tpc_backend::inbound::http::{configure_api, functions};
use tpc_backend::middleware::{Cors, CorsConfig};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cors: CorsConfig,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        cors,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1").wrap(session).configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Cors::new(cors))
        .wrap(Trace)
        .service(api)
        .configure(functions::configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server and start the expiry schedule.
///
/// # Errors
/// Propagates [`std::io::Error`] when settings are invalid or binding the
/// socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        settings,
        mailer,
        db_pool,
    } = config;

    let invoice_settings = settings.invoice_settings().map_err(std::io::Error::other)?;
    let ports = build_http_ports(db_pool.as_ref(), ServiceDeps::new(mailer, invoice_settings));
    let expiry = ports.expiry.clone();

    let service_key = settings.service_key().and_then(|raw| ServiceKey::new(&raw));
    match &service_key {
        Some(key) => info!(fingerprint = key.fingerprint(), "function routes enabled"),
        None => info!("TPC_SERVICE_KEY not set; function routes reject every call"),
    }
    let http_state = web::Data::new(HttpState::new(ports, service_key));
    let cors = CorsConfig::new(settings.cors_origins());

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            cors: cors.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    // Detached; the schedule lives as long as the runtime.
    drop(spawn_expiry_schedule(expiry, settings.sweep_interval()));

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{Method, StatusCode, header};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use std::sync::Arc;
    use tpc_backend::domain::ports::FixtureEmailSender;
    use tpc_backend::domain::{EmailAddress, InvoiceSettings, Mailer};
    use zeroize::Zeroizing;

    fn deps(service_key: Option<&str>) -> AppDependencies {
        let admin = EmailAddress::new("admin@tpcglobal.io").expect("valid admin");
        let mailer = Mailer::new(Arc::new(FixtureEmailSender), admin);
        let ports = build_http_ports(None, ServiceDeps::new(mailer, InvoiceSettings::default()));
        let key = service_key.and_then(|raw| ServiceKey::new(&Zeroizing::new(raw.to_owned())));
        let health = HealthState::new();
        health.mark_ready();
        AppDependencies {
            health_state: web::Data::new(health),
            http_state: web::Data::new(HttpState::new(ports, key)),
            cors: CorsConfig::new(["https://tpcglobal.io"]),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    #[rstest]
    #[actix_rt::test]
    async fn readiness_probe_is_routed() {
        let app = actix_test::init_service(build_app(deps(None))).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_rt::test]
    async fn profile_requires_a_session() {
        let app = actix_test::init_service(build_app(deps(None))).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/me").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case(None, StatusCode::UNAUTHORIZED)]
    #[case(Some("svc"), StatusCode::OK)]
    #[actix_rt::test]
    async fn function_routes_check_the_service_key(
        #[case] configured: Option<&str>,
        #[case] expected: StatusCode,
    ) {
        let app = actix_test::init_service(build_app(deps(configured))).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/functions/v1/expire-invoices")
                .insert_header((header::AUTHORIZATION, "Bearer svc"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), expected);
    }

    #[rstest]
    #[actix_rt::test]
    async fn preflight_echoes_listed_origin() {
        let app = actix_test::init_service(build_app(deps(None))).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::default()
                .method(Method::OPTIONS)
                .uri("/api/v1/invoices")
                .insert_header((header::ORIGIN, "https://tpcglobal.io"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("https://tpcglobal.io")
        );
    }
}
