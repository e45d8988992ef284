//! Transactional email adapters for the `EmailSender` port.
//!
//! [`HttpEmailSender`] posts to a Resend-compatible provider;
//! [`LoggingEmailSender`] stands in when no provider key is configured.

mod http_sender;
mod logging_sender;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{AppSettings, ConfigError};
use crate::domain::Mailer;
use crate::domain::ports::EmailSender;

pub use http_sender::{DEFAULT_EMAIL_ENDPOINT, HttpEmailSender};
pub use logging_sender::LoggingEmailSender;

/// Errors raised while assembling the mailer.
#[derive(Debug, thiserror::Error)]
pub enum MailerSetupError {
    /// A setting was malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The HTTP client could not be built.
    #[error("failed to build email client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Build the [`Mailer`] described by `settings`.
///
/// Without an API key every message is logged instead of sent.
///
/// # Errors
///
/// Returns [`MailerSetupError`] for malformed settings or a client failure.
pub fn mailer_from_settings(settings: &AppSettings) -> Result<Mailer, MailerSetupError> {
    let admin = settings.admin_email()?;
    let sender: Arc<dyn EmailSender> = match settings.email_api_key() {
        Some(api_key) => {
            let endpoint = settings.email_endpoint()?;
            info!(endpoint = %endpoint, "sending email through provider");
            Arc::new(HttpEmailSender::new(
                endpoint,
                api_key,
                settings.email_from(),
                settings.email_timeout(),
            )?)
        }
        None => {
            warn!("TPC_EMAIL_API_KEY not set; outgoing email will only be logged");
            Arc::new(LoggingEmailSender)
        }
    };
    Ok(Mailer::new(sender, admin))
}
