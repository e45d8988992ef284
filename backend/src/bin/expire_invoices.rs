//! Run one invoice expiry sweep and print the report as JSON.
//!
//! Intended for cron hosts that prefer a process over calling
//! `POST /functions/v1/expire-invoices`. Email settings come from the same
//! `TPC_*` environment as the server.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

use tpc_backend::config::AppSettings;
use tpc_backend::domain::InvoiceExpiryService;
use tpc_backend::domain::ports::InvoiceExpirySweep;
use tpc_backend::outbound::email::mailer_from_settings;
use tpc_backend::outbound::persistence::{
    DbPool, DieselInvoiceRepository, DieselProfileRepository, PoolConfig,
};

/// `expire-invoices` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "expire-invoices",
    about = "Expire overdue unpaid invoices and email their owners",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `TPC_DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init();

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let settings = AppSettings::load_from_iter([OsString::from("expire-invoices")])
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let database_url = match args.database_url {
        Some(url) => url,
        None => settings
            .database_url()
            .map(|url| url.to_string())
            .ok_or_else(|| eyre!("missing --database-url and TPC_DATABASE_URL"))?,
    };

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .wrap_err("failed to create database pool")?;
    let mailer = mailer_from_settings(&settings).wrap_err("failed to configure email")?;
    let sweep = InvoiceExpiryService::new(
        Arc::new(DieselInvoiceRepository::new(pool.clone())),
        Arc::new(DieselProfileRepository::new(pool)),
        mailer,
        Arc::new(DefaultClock),
    );

    let report = sweep
        .run_sweep()
        .await
        .map_err(|err| eyre!("expiry sweep failed: {}", err.message()))?;
    println!(
        "{}",
        serde_json::to_string(&report).wrap_err("failed to serialise report")?
    );
    Ok(())
}
