//! Reqwest-backed sender for a Resend-compatible email API.
//!
//! This adapter owns transport details only: payload serialisation, bearer
//! authentication, timeout and HTTP status mapping.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::EmailMessage;
use crate::domain::ports::{EmailSender, EmailSenderError};

/// Resend's send endpoint.
pub const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct OutgoingEmailDto<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

impl<'a> OutgoingEmailDto<'a> {
    fn new(from: &'a str, message: &'a EmailMessage) -> Self {
        Self {
            from,
            to: [message.to.as_ref()],
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        }
    }
}

/// Sender that performs one HTTP POST per message.
pub struct HttpEmailSender {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    from: String,
}

impl fmt::Debug for HttpEmailSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpEmailSender")
            .field("endpoint", &self.endpoint.as_str())
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl HttpEmailSender {
    /// Build a sender with an explicit request timeout.
    ///
    /// `from` is the provider-verified sender, e.g.
    /// `TPC Global <noreply@tpcglobal.io>`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: Zeroizing<String>,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            from: from.into(),
        })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailSenderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(&OutgoingEmailDto::new(&self.from, message))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "email accepted by provider");
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_transport_error(error: reqwest::Error) -> EmailSenderError {
    if error.is_timeout() {
        EmailSenderError::timeout(error.to_string())
    } else {
        EmailSenderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EmailSenderError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => EmailSenderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            EmailSenderError::timeout(message)
        }
        _ if status.is_client_error() => EmailSenderError::rejected(message),
        _ => EmailSenderError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Status mapping, payload shape, and a round trip against a local
    //! listener.

    use super::*;
    use crate::domain::EmailAddress;
    use rstest::{fixture, rstest};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[fixture]
    fn message() -> EmailMessage {
        EmailMessage {
            to: EmailAddress::new("budi@example.com").expect("valid email"),
            subject: "Invoice TPC-20260301-7K2M9Q".to_owned(),
            html: "<p>Pay &amp; confirm</p>".to_owned(),
            text: "Pay & confirm".to_owned(),
        }
    }

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "rate_limited")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "timeout")]
    #[case::unverified_sender(StatusCode::FORBIDDEN, "rejected")]
    #[case::validation(StatusCode::UNPROCESSABLE_ENTITY, "rejected")]
    #[case::server_error(StatusCode::BAD_GATEWAY, "transport")]
    fn maps_provider_statuses(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, br#"{"message":"nope"}"#);
        let matched = match expected {
            "rate_limited" => matches!(error, EmailSenderError::RateLimited { .. }),
            "timeout" => matches!(error, EmailSenderError::Timeout { .. }),
            "rejected" => matches!(error, EmailSenderError::Rejected { .. }),
            _ => matches!(error, EmailSenderError::Transport { .. }),
        };
        assert!(matched, "{status} mapped to {error:?}");
        assert!(error.to_string().contains("nope"));
    }

    #[rstest]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
    }

    #[rstest]
    fn payload_matches_provider_shape(message: EmailMessage) {
        let payload = serde_json::to_value(OutgoingEmailDto::new(
            "TPC Global <noreply@tpcglobal.io>",
            &message,
        ))
        .expect("serialise payload");
        assert_eq!(payload["from"], "TPC Global <noreply@tpcglobal.io>");
        assert_eq!(payload["to"][0], "budi@example.com");
        assert_eq!(payload["subject"], "Invoice TPC-20260301-7K2M9Q");
        assert_eq!(payload["text"], "Pay & confirm");
    }

    #[rstest]
    fn debug_output_hides_the_api_key() {
        let sender = HttpEmailSender::new(
            Url::parse(DEFAULT_EMAIL_ENDPOINT).expect("endpoint"),
            Zeroizing::new("re_secret_key".to_owned()),
            "noreply@tpcglobal.io",
            Duration::from_secs(5),
        )
        .expect("client");
        assert!(!format!("{sender:?}").contains("re_secret_key"));
    }

    /// Accept one connection, capture the request head, reply with `reply`.
    async fn serve_once(reply: &'static str) -> (Url, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buf = vec![0_u8; 8192];
            let read = socket.read(&mut buf).await.expect("read request");
            socket
                .write_all(reply.as_bytes())
                .await
                .expect("write response");
            String::from_utf8_lossy(buf.get(..read).unwrap_or_default()).into_owned()
        });
        let url = Url::parse(&format!("http://{addr}/emails")).expect("url");
        (url, handle)
    }

    #[rstest]
    #[tokio::test]
    async fn sends_bearer_authenticated_json(message: EmailMessage) {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 11\r\nconnection: close\r\n\r\n{\"id\":\"e1\"}",
        )
        .await;
        let sender = HttpEmailSender::new(
            url,
            Zeroizing::new("re_test".to_owned()),
            "noreply@tpcglobal.io",
            Duration::from_secs(5),
        )
        .expect("client");

        sender.send(&message).await.expect("provider accepts");
        let request = server.await.expect("server task");
        assert!(request.starts_with("POST /emails"), "{request}");
        assert!(
            request.to_ascii_lowercase().contains("authorization: bearer re_test"),
            "{request}"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn throttled_sends_are_rate_limited(message: EmailMessage) {
        let (url, server) = serve_once(
            "HTTP/1.1 429 Too Many Requests\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let sender = HttpEmailSender::new(
            url,
            Zeroizing::new("re_test".to_owned()),
            "noreply@tpcglobal.io",
            Duration::from_secs(5),
        )
        .expect("client");

        let error = sender.send(&message).await.expect_err("throttled");
        assert!(matches!(error, EmailSenderError::RateLimited { .. }));
        server.await.expect("server task");
    }
}
