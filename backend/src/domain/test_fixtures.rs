//! Shared builders for domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    EmailAddress, FullName, Invoice, InvoiceDraft, InvoiceId, InvoiceNumber, Language, MemberCode,
    MemberId, MemberRole, PaymentCurrency, Profile, Quote, ReferralCode,
};

pub(crate) fn sample_profile(language: Language) -> Profile {
    Profile {
        id: MemberId::random(),
        email: EmailAddress::new("budi@example.com").expect("valid email"),
        full_name: FullName::new("Budi Santoso").expect("valid name"),
        member_code: MemberCode::new("TPC000101").expect("valid member code"),
        referral_code: ReferralCode::new("BUDI2345").expect("valid referral code"),
        sponsor_id: None,
        role: MemberRole::Member,
        language,
        password_hash: String::new(),
        created_at: Utc::now(),
    }
}

pub(crate) fn sample_invoice(member_id: MemberId) -> Invoice {
    Invoice::issue(InvoiceDraft {
        id: InvoiceId::random(),
        number: InvoiceNumber::new("TPC-20260301-QX7K2M").expect("valid number"),
        member_id,
        quote: Quote {
            currency: PaymentCurrency::Usdc,
            amount_input: 10_000,
            usd_cents: 10_000,
            tpc_amount: 10_000,
        },
        created_at: fixture_timestamp(),
        ttl: Duration::hours(24),
    })
}

pub(crate) struct FixtureClock {
    pub(crate) utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}
