//! Presale quotes: how many whole tokens an amount buys at the current stage.
//!
//! All arithmetic is integer. Fractions of a token are truncated; the member
//! pays the amount they entered.

use super::PaymentCurrency;

/// Stage pricing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    /// Price of one token in USD cents.
    pub price_cents: i64,
    /// Rupiah per US dollar.
    pub idr_per_usd: i64,
    /// Smallest accepted purchase in USD cents.
    pub min_usd_cents: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_cents: 1,
            idr_per_usd: 16_000,
            min_usd_cents: 1_000,
        }
    }
}

/// Priced purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Payment currency.
    pub currency: PaymentCurrency,
    /// Amount entered, in the currency's minor unit.
    pub amount_input: i64,
    /// Amount converted to USD cents.
    pub usd_cents: i64,
    /// Whole tokens bought.
    pub tpc_amount: i64,
}

/// Reasons a purchase cannot be priced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// Amount is zero or negative.
    #[error("amount must be positive")]
    NonPositiveAmount,
    /// Amount is below the configured minimum.
    #[error("amount is below the minimum purchase of {min_usd_cents} US cents")]
    BelowMinimum {
        /// Minimum accepted purchase.
        min_usd_cents: i64,
    },
    /// Amount does not buy a single whole token.
    #[error("amount does not buy any tokens")]
    ZeroTokens,
    /// Amount overflows the arithmetic.
    #[error("amount is too large")]
    AmountTooLarge,
    /// Price or exchange rate is not positive.
    #[error("pricing is not configured")]
    Misconfigured,
}

impl PricingConfig {
    /// Price `amount` paid in `currency`.
    ///
    /// # Examples
    /// ```
    /// use tpc_backend::domain::{PaymentCurrency, PricingConfig};
    ///
    /// let pricing = PricingConfig { price_cents: 2, idr_per_usd: 16_000, min_usd_cents: 100 };
    /// let quote = pricing.quote(PaymentCurrency::Idr, 160_000).expect("priced");
    /// assert_eq!(quote.usd_cents, 1_000);
    /// assert_eq!(quote.tpc_amount, 500);
    /// ```
    pub fn quote(&self, currency: PaymentCurrency, amount: i64) -> Result<Quote, PricingError> {
        if self.price_cents <= 0 || self.idr_per_usd <= 0 {
            return Err(PricingError::Misconfigured);
        }
        if amount <= 0 {
            return Err(PricingError::NonPositiveAmount);
        }
        let usd_cents = match currency {
            PaymentCurrency::Usdc => amount,
            PaymentCurrency::Idr => {
                amount
                    .checked_mul(100)
                    .ok_or(PricingError::AmountTooLarge)?
                    / self.idr_per_usd
            }
        };
        if usd_cents < self.min_usd_cents {
            return Err(PricingError::BelowMinimum {
                min_usd_cents: self.min_usd_cents,
            });
        }
        let tpc_amount = usd_cents / self.price_cents;
        if tpc_amount == 0 {
            return Err(PricingError::ZeroTokens);
        }
        Ok(Quote {
            currency,
            amount_input: amount,
            usd_cents,
            tpc_amount,
        })
    }
}
