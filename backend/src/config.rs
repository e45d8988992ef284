//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `TPC_*` environment variables and an optional
//! config file, in OrthoConfig's usual precedence. Accessors apply defaults
//! and validation so callers never see half-parsed values. Secrets are handed
//! out wrapped in [`Zeroizing`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{EmailAddress, InvoiceSettings, PricingConfig};
use crate::outbound::email::DEFAULT_EMAIL_ENDPOINT;

/// Environment variable that overrides the admin notification recipient.
pub const ADMIN_EMAIL_OVERRIDE_ENV: &str = "ADMIN_NOTIFICATION_EMAIL";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_EMAIL_FROM: &str = "TPC Global <noreply@tpcglobal.io>";
const DEFAULT_ADMIN_EMAIL: &str = "admin@tpcglobal.io";
const DEFAULT_EMAIL_TIMEOUT_SECS: u64 = 10;
const DEFAULT_INVOICE_TTL_HOURS: i64 = 24;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(origin) => vec![origin],
            OneOrMany::Many(origins) => origins,
        }),
    )
}

/// Errors raised when a configured value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A value is present but malformed or out of range.
    #[error("invalid value for {name}='{value}': {reason}")]
    Invalid {
        /// Setting name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// What was expected.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, value: impl ToString, reason: impl ToString) -> Self {
        Self::Invalid {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Settings for the TPC backend service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TPC")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL; without it the server runs on fixtures.
    pub database_url: Option<String>,
    /// Skip embedded migrations at startup.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
    /// Bearer token for `/functions/v1` routes.
    pub service_key: Option<String>,
    /// Email provider API key; without it emails are only logged.
    pub email_api_key: Option<String>,
    /// Email provider endpoint.
    pub email_endpoint: Option<String>,
    /// Sender shown on outgoing email.
    pub email_from: Option<String>,
    /// Provider request timeout in seconds.
    pub email_timeout_secs: Option<u64>,
    /// Admin notification recipient.
    pub admin_email: Option<String>,
    /// CORS origins; empty allows any.
    ///
    /// The environment provider splits comma-separated values into a list
    /// and leaves a single origin as a plain string, so both are accepted.
    #[serde(default, deserialize_with = "one_or_many")]
    pub cors_origins: Option<Vec<String>>,
    /// Invoice payment window in hours.
    pub invoice_ttl_hours: Option<i64>,
    /// Seconds between scheduled expiry sweeps; 0 disables the schedule.
    pub sweep_interval_secs: Option<u64>,
    /// Stage price per TPC in USD cents.
    pub stage_price_cents: Option<i64>,
    /// Rupiah per US dollar.
    pub idr_per_usd: Option<i64>,
    /// Smallest purchase in USD cents.
    pub min_usd_cents: Option<i64>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Send session cookies over plain HTTP too (local development).
    #[ortho_config(default = false)]
    pub session_cookie_insecure: bool,
    /// Fall back to a generated session key when the key file is missing.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
}

fn secret(value: Option<&String>) -> Option<Zeroizing<String>> {
    value
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .map(|raw| Zeroizing::new(raw.to_owned()))
}

fn positive(name: &'static str, value: Option<i64>, default: i64) -> Result<i64, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) if v > 0 => Ok(v),
        Some(v) => Err(ConfigError::invalid(name, v, "must be greater than zero")),
    }
}

impl AppSettings {
    /// Bind address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|err| ConfigError::invalid("bind_addr", raw, err))
    }

    /// Database URL, if configured.
    pub fn database_url(&self) -> Option<Zeroizing<String>> {
        secret(self.database_url.as_ref())
    }

    /// Whether startup should apply pending migrations.
    pub fn run_migrations(&self) -> bool {
        !self.skip_migrations
    }

    /// Service key for function routes, if configured.
    pub fn service_key(&self) -> Option<Zeroizing<String>> {
        secret(self.service_key.as_ref())
    }

    /// Email provider API key, if configured.
    pub fn email_api_key(&self) -> Option<Zeroizing<String>> {
        secret(self.email_api_key.as_ref())
    }

    /// Email provider endpoint, defaulting to Resend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the endpoint is not an absolute URL.
    pub fn email_endpoint(&self) -> Result<Url, ConfigError> {
        let raw = self
            .email_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_EMAIL_ENDPOINT);
        Url::parse(raw).map_err(|err| ConfigError::invalid("email_endpoint", raw, err))
    }

    /// Sender address for outgoing email.
    pub fn email_from(&self) -> &str {
        self.email_from
            .as_deref()
            .map(str::trim)
            .filter(|from| !from.is_empty())
            .unwrap_or(DEFAULT_EMAIL_FROM)
    }

    /// Provider request timeout.
    pub fn email_timeout(&self) -> Duration {
        Duration::from_secs(
            self.email_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_EMAIL_TIMEOUT_SECS),
        )
    }

    /// Admin recipient, honouring `ADMIN_NOTIFICATION_EMAIL`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the chosen address is malformed.
    pub fn admin_email(&self) -> Result<EmailAddress, ConfigError> {
        self.admin_email_with_override(std::env::var(ADMIN_EMAIL_OVERRIDE_ENV).ok())
    }

    /// Admin recipient with an explicit override value.
    ///
    /// A blank override is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the chosen address is malformed.
    pub fn admin_email_with_override(
        &self,
        override_value: Option<String>,
    ) -> Result<EmailAddress, ConfigError> {
        let (name, raw) = match override_value.filter(|v| !v.trim().is_empty()) {
            Some(value) => (ADMIN_EMAIL_OVERRIDE_ENV, value),
            None => (
                "admin_email",
                self.admin_email
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_owned()),
            ),
        };
        EmailAddress::new(&raw).map_err(|err| ConfigError::invalid(name, raw, err))
    }

    /// Allowed CORS origins.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins
            .iter()
            .flatten()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Invoice pricing and payment window.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any value is zero or negative.
    pub fn invoice_settings(&self) -> Result<InvoiceSettings, ConfigError> {
        let defaults = PricingConfig::default();
        let pricing = PricingConfig {
            price_cents: positive(
                "stage_price_cents",
                self.stage_price_cents,
                defaults.price_cents,
            )?,
            idr_per_usd: positive("idr_per_usd", self.idr_per_usd, defaults.idr_per_usd)?,
            min_usd_cents: positive("min_usd_cents", self.min_usd_cents, defaults.min_usd_cents)?,
        };
        let ttl_hours = positive(
            "invoice_ttl_hours",
            self.invoice_ttl_hours,
            DEFAULT_INVOICE_TTL_HOURS,
        )?;
        Ok(InvoiceSettings {
            pricing,
            ttl: chrono::Duration::hours(ttl_hours),
        })
    }

    /// Period of the in-process expiry schedule; zero disables it.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS))
    }

    /// Path to the session signing key.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Whether session cookies carry the `Secure` flag.
    pub fn cookie_secure(&self) -> bool {
        !self.session_cookie_insecure
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "TPC_BIND_ADDR",
        "TPC_DATABASE_URL",
        "TPC_SERVICE_KEY",
        "TPC_ADMIN_EMAIL",
        "TPC_CORS_ORIGINS",
        "TPC_INVOICE_TTL_HOURS",
        "TPC_SWEEP_INTERVAL_SECS",
        "TPC_STAGE_PRICE_CENTS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("tpc-backend")]).expect("config should load")
    }

    /// Every known variable, unset unless listed in `overrides`.
    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default bind"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.database_url().is_none());
        assert!(settings.service_key().is_none());
        assert!(settings.run_migrations());
        assert!(settings.cookie_secure());
        assert_eq!(settings.sweep_interval(), Duration::from_secs(300));
        assert_eq!(
            settings.invoice_settings().expect("defaults").ttl,
            chrono::Duration::hours(24)
        );
        assert_eq!(settings.email_from(), DEFAULT_EMAIL_FROM);
        assert!(settings.cors_origins().is_empty());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("TPC_BIND_ADDR", "127.0.0.1:9090"),
            ("TPC_SERVICE_KEY", "svc-key"),
            (
                "TPC_CORS_ORIGINS",
                "https://tpcglobal.io, https://www.tpcglobal.io",
            ),
            ("TPC_INVOICE_TTL_HOURS", "48"),
            ("TPC_SWEEP_INTERVAL_SECS", "0"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().expect("bind").port(), 9090);
        assert_eq!(
            settings.service_key().as_deref().map(String::as_str),
            Some("svc-key")
        );
        assert_eq!(
            settings.cors_origins(),
            vec!["https://tpcglobal.io", "https://www.tpcglobal.io"]
        );
        assert_eq!(
            settings.invoice_settings().expect("settings").ttl,
            chrono::Duration::hours(48)
        );
        assert!(settings.sweep_interval().is_zero());
    }

    #[rstest]
    #[case("https://tpcglobal.io", vec!["https://tpcglobal.io"])]
    #[case("https://a.tpcglobal.io,https://b.tpcglobal.io,", vec!["https://a.tpcglobal.io", "https://b.tpcglobal.io"])]
    #[case("[\"https://tpcglobal.io\"]", vec!["https://tpcglobal.io"])]
    #[case("*", vec!["*"])]
    fn cors_origins_accept_single_and_listed_values(
        #[case] raw: &str,
        #[case] expected: Vec<&str>,
    ) {
        let _guard = lock_env(env_with(&[("TPC_CORS_ORIGINS", raw)]));

        assert_eq!(load_from_empty_args().cors_origins(), expected);
    }

    #[rstest]
    fn non_positive_prices_are_rejected() {
        let _guard = lock_env(env_with(&[("TPC_STAGE_PRICE_CENTS", "0")]));

        let err = load_from_empty_args()
            .invoice_settings()
            .expect_err("zero price");
        assert!(err.to_string().contains("stage_price_cents"), "{err}");
    }

    #[rstest]
    fn blank_secrets_count_as_unset() {
        let _guard = lock_env(env_with(&[("TPC_SERVICE_KEY", "   ")]));

        assert!(load_from_empty_args().service_key().is_none());
    }

    #[rstest]
    #[case(None, "admin@tpcglobal.io")]
    #[case(Some("  "), "admin@tpcglobal.io")]
    #[case(Some("Ops@TPCGlobal.io"), "ops@tpcglobal.io")]
    fn admin_override_wins_when_present(#[case] over: Option<&str>, #[case] expected: &str) {
        let _guard = lock_env(env_with(&[]));

        let admin = load_from_empty_args()
            .admin_email_with_override(over.map(str::to_owned))
            .expect("valid admin");
        assert_eq!(admin.as_ref(), expected);
    }

    #[rstest]
    fn malformed_override_names_the_variable() {
        let _guard = lock_env(env_with(&[]));

        let err = load_from_empty_args()
            .admin_email_with_override(Some("not-an-email".to_owned()))
            .expect_err("invalid override");
        assert!(err.to_string().contains(ADMIN_EMAIL_OVERRIDE_ENV), "{err}");
    }
}
