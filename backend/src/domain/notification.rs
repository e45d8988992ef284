//! Transactional email content.
//!
//! Templates are plain functions returning an [`EmailMessage`] in the
//! recipient's language. Every interpolated value goes through
//! [`escape_html`] before landing in the HTML body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EmailAddress, Invoice, Language, PaymentCurrency, Profile, Withdrawal};

/// Rendered email ready for an [`crate::domain::ports::EmailSender`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    /// Recipient.
    pub to: EmailAddress,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plain-text alternative.
    pub text: String,
}

/// Member-facing invoice emails that can be re-sent on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceEmailKind {
    /// Invoice issued with payment instructions.
    Created,
    /// Payment window closed.
    Expired,
    /// Payment confirmed.
    Paid,
}

/// Error returned when parsing an unknown email kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("email kind must be 'created', 'expired' or 'paid', got '{0}'")]
pub struct UnknownEmailKind(pub String);

impl std::str::FromStr for InvoiceEmailKind {
    type Err = UnknownEmailKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "expired" => Ok(Self::Expired),
            "paid" => Ok(Self::Paid),
            _ => Err(UnknownEmailKind(s.to_owned())),
        }
    }
}

/// Escape text for safe inclusion in HTML element content and attributes.
///
/// # Examples
/// ```
/// use tpc_backend::domain::escape_html;
///
/// assert_eq!(escape_html("<b>\"Budi\" & 'Siti'</b>"),
///     "&lt;b&gt;&quot;Budi&quot; &amp; &#39;Siti&#39;&lt;/b&gt;");
/// ```
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Group digits in threes with `sep`.
fn group_digits(value: i64, sep: char) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(sep);
        }
        out.push(digit);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

/// Format whole tokens for `language` (`1,250 TPC` or `1.250 TPC`).
pub fn format_tpc(amount: i64, language: Language) -> String {
    let sep = match language {
        Language::En => ',',
        Language::Id => '.',
    };
    format!("{} TPC", group_digits(amount, sep))
}

/// Format a payment amount given in the currency's minor unit.
pub fn format_payment(currency: PaymentCurrency, amount: i64, language: Language) -> String {
    let (thousands, decimal) = match language {
        Language::En => (',', '.'),
        Language::Id => ('.', ','),
    };
    match currency {
        PaymentCurrency::Idr => format!("Rp {}", group_digits(amount, thousands)),
        PaymentCurrency::Usdc => format!(
            "{}{decimal}{:02} USDC",
            group_digits(amount / 100, thousands),
            (amount % 100).abs()
        ),
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

struct Rendered {
    subject: String,
    paragraphs: Vec<String>,
}

fn layout(to: &EmailAddress, greeting: &str, rendered: Rendered) -> EmailMessage {
    let mut html = String::from(
        "<div style=\"font-family:Arial,sans-serif;max-width:560px;margin:0 auto;color:#1f2937\">",
    );
    html.push_str(&format!("<p>{}</p>", escape_html(greeting)));
    for paragraph in &rendered.paragraphs {
        html.push_str(&format!("<p>{}</p>", escape_html(paragraph)));
    }
    html.push_str("<p style=\"color:#6b7280;font-size:12px\">TPC Global</p></div>");

    let mut text = format!("{greeting}\n\n");
    text.push_str(&rendered.paragraphs.join("\n\n"));
    text.push_str("\n\nTPC Global\n");

    EmailMessage {
        to: to.clone(),
        subject: rendered.subject,
        html,
        text,
    }
}

fn greeting(profile: &Profile) -> String {
    match profile.language {
        Language::En => format!("Hello {},", profile.full_name.as_ref()),
        Language::Id => format!("Halo {},", profile.full_name.as_ref()),
    }
}

/// Invoice issued; tells the member what to pay and by when.
pub fn invoice_created(profile: &Profile, invoice: &Invoice) -> EmailMessage {
    let lang = profile.language;
    let amount = format_payment(invoice.currency, invoice.amount_input, lang);
    let tokens = format_tpc(invoice.tpc_amount, lang);
    let deadline = format_time(invoice.expires_at);
    let rendered = match lang {
        Language::En => Rendered {
            subject: format!("Invoice {} created", invoice.number),
            paragraphs: vec![
                format!("Your invoice {} for {tokens} has been created.", invoice.number),
                format!("Please pay {amount} and upload your proof of payment before {deadline}."),
                "Unpaid invoices expire automatically after the deadline.".to_owned(),
            ],
        },
        Language::Id => Rendered {
            subject: format!("Invoice {} telah dibuat", invoice.number),
            paragraphs: vec![
                format!("Invoice {} untuk {tokens} telah dibuat.", invoice.number),
                format!("Silakan bayar {amount} dan unggah bukti pembayaran sebelum {deadline}."),
                "Invoice yang belum dibayar akan kedaluwarsa otomatis setelah batas waktu."
                    .to_owned(),
            ],
        },
    };
    layout(&profile.email, &greeting(profile), rendered)
}

/// Payment window closed without payment.
pub fn invoice_expired(profile: &Profile, invoice: &Invoice) -> EmailMessage {
    let lang = profile.language;
    let tokens = format_tpc(invoice.tpc_amount, lang);
    let rendered = match lang {
        Language::En => Rendered {
            subject: format!("Invoice {} has expired", invoice.number),
            paragraphs: vec![
                format!(
                    "Your invoice {} for {tokens} expired because no payment was received in time.",
                    invoice.number
                ),
                "You can create a new invoice from your member dashboard at any time.".to_owned(),
            ],
        },
        Language::Id => Rendered {
            subject: format!("Invoice {} telah kedaluwarsa", invoice.number),
            paragraphs: vec![
                format!(
                    "Invoice {} untuk {tokens} telah kedaluwarsa karena pembayaran tidak diterima tepat waktu.",
                    invoice.number
                ),
                "Anda dapat membuat invoice baru kapan saja dari dashboard member.".to_owned(),
            ],
        },
    };
    layout(&profile.email, &greeting(profile), rendered)
}

/// Payment confirmed by an admin.
pub fn invoice_paid(profile: &Profile, invoice: &Invoice) -> EmailMessage {
    let lang = profile.language;
    let tokens = format_tpc(invoice.tpc_amount, lang);
    let rendered = match lang {
        Language::En => Rendered {
            subject: format!("Payment confirmed for invoice {}", invoice.number),
            paragraphs: vec![
                format!("We have confirmed your payment for invoice {}.", invoice.number),
                format!("{tokens} has been allocated to your account."),
            ],
        },
        Language::Id => Rendered {
            subject: format!("Pembayaran invoice {} dikonfirmasi", invoice.number),
            paragraphs: vec![
                format!("Pembayaran untuk invoice {} telah kami konfirmasi.", invoice.number),
                format!("{tokens} telah dialokasikan ke akun Anda."),
            ],
        },
    };
    layout(&profile.email, &greeting(profile), rendered)
}

/// Withdrawal request received.
pub fn withdrawal_received(profile: &Profile, withdrawal: &Withdrawal) -> EmailMessage {
    let lang = profile.language;
    let tokens = format_tpc(withdrawal.tpc_amount, lang);
    let wallet = withdrawal.wallet_address.as_ref();
    let rendered = match lang {
        Language::En => Rendered {
            subject: "Withdrawal request received".to_owned(),
            paragraphs: vec![
                format!("We received your request to withdraw {tokens} to {wallet}."),
                "An admin will review it shortly.".to_owned(),
            ],
        },
        Language::Id => Rendered {
            subject: "Permintaan penarikan diterima".to_owned(),
            paragraphs: vec![
                format!("Permintaan penarikan {tokens} ke {wallet} telah kami terima."),
                "Admin akan segera meninjaunya.".to_owned(),
            ],
        },
    };
    layout(&profile.email, &greeting(profile), rendered)
}

/// Admin alert: a member uploaded payment proof.
pub fn admin_proof_submitted(
    admin: &EmailAddress,
    member: &Profile,
    invoice: &Invoice,
) -> EmailMessage {
    admin_notice(
        admin,
        &format!("Payment proof submitted for {}", invoice.number),
        &format!(
            "{} ({}) submitted payment proof for invoice {}: {} for {}. Proof: {}",
            member.full_name.as_ref(),
            member.member_code,
            invoice.number,
            format_payment(invoice.currency, invoice.amount_input, Language::En),
            format_tpc(invoice.tpc_amount, Language::En),
            invoice.proof_url.as_deref().unwrap_or("-"),
        ),
    )
}

/// Admin alert: a member requested a withdrawal.
pub fn admin_withdrawal_requested(
    admin: &EmailAddress,
    member: &Profile,
    withdrawal: &Withdrawal,
) -> EmailMessage {
    admin_notice(
        admin,
        "New withdrawal request",
        &format!(
            "{} ({}) requested a withdrawal of {} to {}.",
            member.full_name.as_ref(),
            member.member_code,
            format_tpc(withdrawal.tpc_amount, Language::En),
            withdrawal.wallet_address.as_ref(),
        ),
    )
}

/// Free-form admin alert.
pub fn admin_notice(admin: &EmailAddress, subject: &str, message: &str) -> EmailMessage {
    let paragraphs = message
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect();
    layout(
        admin,
        "Admin notification",
        Rendered {
            subject: format!("[TPC Admin] {}", subject.trim()),
            paragraphs,
        },
    )
}
