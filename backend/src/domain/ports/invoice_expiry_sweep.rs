//! Driving port for the invoice expiry sweep.
//!
//! Triggered by the function endpoint, the in-process scheduler and the
//! `expire-invoices` binary.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::Error;

/// Outcome of one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Invoices this run moved to `EXPIRED`.
    pub expired: usize,
    /// Expiry emails the provider accepted.
    pub emails_sent: usize,
    /// Expiry emails that could not be sent.
    pub emails_failed: usize,
}

/// Driving port for expiring overdue invoices.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceExpirySweep: Send + Sync {
    /// Expire overdue unpaid invoices and email their owners.
    ///
    /// Repository failures abort the run; email failures are counted.
    async fn run_sweep(&self) -> Result<SweepReport, Error>;
}

/// Fixture sweep that never finds anything to expire.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInvoiceExpirySweep;

#[async_trait]
impl InvoiceExpirySweep for FixtureInvoiceExpirySweep {
    async fn run_sweep(&self) -> Result<SweepReport, Error> {
        Ok(SweepReport::default())
    }
}
