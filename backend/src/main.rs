//! Backend entry-point: loads settings, prepares the database and serves the
//! member API, function routes and health probes.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use tpc_backend::config::AppSettings;
use tpc_backend::inbound::http::health::HealthState;
use tpc_backend::inbound::http::session_config::{BuildMode, key_fingerprint, session_settings};
use tpc_backend::outbound::email::mailer_from_settings;
use tpc_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let session = session_settings(&settings, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session signing key loaded"
    );
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let mailer = mailer_from_settings(&settings).map_err(std::io::Error::other)?;

    let db_pool = match settings.database_url() {
        Some(url) => {
            if settings.run_migrations() {
                run_migrations(&url).await.map_err(std::io::Error::other)?;
            }
            let pool = DbPool::new(PoolConfig::new(url.as_str()))
                .await
                .map_err(std::io::Error::other)?;
            Some(pool)
        }
        None => {
            warn!("TPC_DATABASE_URL not set; serving fixture data only");
            None
        }
    };

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        settings,
        mailer,
    );
    if let Some(pool) = db_pool {
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "server listening");
    server.await
}
