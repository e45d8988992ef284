//! Generators for human-facing identifiers.
//!
//! Invoice numbers, member codes and referral codes are random and checked
//! for uniqueness by the database; services retry on a collision.

use chrono::{DateTime, Utc};
use rand::Rng;

use super::{InvoiceNumber, MemberCode, ReferralCode};

const UPPER_ALPHANUMERIC: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Source of fresh identifiers.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use tpc_backend::domain::{CodeGenerator, RandomCodeGenerator};
///
/// let generator = RandomCodeGenerator;
/// let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("valid time");
/// let number = generator.invoice_number(now);
/// assert!(number.as_ref().starts_with("TPC-20260301-"));
/// ```
pub trait CodeGenerator: Send + Sync {
    /// Invoice number for an invoice issued at `issued_at`.
    fn invoice_number(&self, issued_at: DateTime<Utc>) -> InvoiceNumber;

    /// Member number for a new profile.
    fn member_code(&self) -> MemberCode;

    /// Shareable referral code for a new profile.
    fn referral_code(&self) -> ReferralCode;
}

/// Default generator backed by the thread-local RNG.
///
/// Ambiguous glyphs (`0`, `O`, `1`, `I`) are excluded from the letter codes
/// because members read them aloud to each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl RandomCodeGenerator {
    fn upper_alphanumeric(len: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..len)
            .map(|_| {
                let index = rng.gen_range(0..UPPER_ALPHANUMERIC.len());
                char::from(UPPER_ALPHANUMERIC.get(index).copied().unwrap_or(b'X'))
            })
            .collect()
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn invoice_number(&self, issued_at: DateTime<Utc>) -> InvoiceNumber {
        InvoiceNumber::compose(issued_at, &Self::upper_alphanumeric(6))
    }

    fn member_code(&self) -> MemberCode {
        let number: u32 = rand::thread_rng().gen_range(0..1_000_000);
        MemberCode::from_number(number)
    }

    fn referral_code(&self) -> ReferralCode {
        ReferralCode::from_generated(Self::upper_alphanumeric(super::REFERRAL_CODE_LEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    fn generated_codes_pass_validation() {
        let generator = RandomCodeGenerator;
        let now = Utc
            .with_ymd_and_hms(2026, 10, 16, 23, 59, 0)
            .single()
            .expect("valid time");
        for _ in 0..64 {
            let number = generator.invoice_number(now);
            assert!(InvoiceNumber::new(number.as_ref()).is_ok(), "{number}");
            let member = generator.member_code();
            assert!(MemberCode::new(member.as_ref()).is_ok(), "{member}");
            let referral = generator.referral_code();
            assert!(ReferralCode::new(referral.as_ref()).is_ok(), "{referral}");
        }
    }
}
