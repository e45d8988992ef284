//! Invoice expiry sweep and its in-process schedule.
//!
//! The sweep hands selection and update to a single repository call, so each
//! overdue invoice is transitioned by exactly one run even when runs overlap.
//! Only the run that transitioned an invoice emails its owner.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::notification;
use super::notification_service::Mailer;
use super::port_error_mapping::map_invoice_repository_error;
use super::ports::{InvoiceExpirySweep, InvoiceRepository, ProfileRepository, SweepReport};
use super::{Error, Invoice, TraceId};

/// Service implementing [`InvoiceExpirySweep`].
#[derive(Clone)]
pub struct InvoiceExpiryService<I, P> {
    invoices: Arc<I>,
    profiles: Arc<P>,
    mailer: Mailer,
    clock: Arc<dyn Clock>,
}

impl<I, P> InvoiceExpiryService<I, P> {
    /// Create the sweep service.
    pub fn new(invoices: Arc<I>, profiles: Arc<P>, mailer: Mailer, clock: Arc<dyn Clock>) -> Self {
        Self {
            invoices,
            profiles,
            mailer,
            clock,
        }
    }
}

impl<I, P> InvoiceExpiryService<I, P>
where
    P: ProfileRepository,
{
    async fn notify_owner(&self, invoice: &Invoice) -> bool {
        let profile = match self.profiles.find_by_id(&invoice.member_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(invoice_id = %invoice.id, "expired invoice has no owner profile");
                return false;
            }
            Err(error) => {
                warn!(invoice_id = %invoice.id, %error, "expired invoice owner lookup failed");
                return false;
            }
        };
        self.mailer
            .send_best_effort(
                &notification::invoice_expired(&profile, invoice),
                "invoice_expired",
            )
            .await
    }
}

#[async_trait]
impl<I, P> InvoiceExpirySweep for InvoiceExpiryService<I, P>
where
    I: InvoiceRepository,
    P: ProfileRepository,
{
    async fn run_sweep(&self) -> Result<SweepReport, Error> {
        let now = self.clock.utc();
        let expired = self
            .invoices
            .expire_unpaid_before(now)
            .await
            .map_err(map_invoice_repository_error)?;

        let mut report = SweepReport {
            expired: expired.len(),
            ..SweepReport::default()
        };
        for invoice in &expired {
            if self.notify_owner(invoice).await {
                report.emails_sent += 1;
            } else {
                report.emails_failed += 1;
            }
        }

        info!(
            expired = report.expired,
            emails_sent = report.emails_sent,
            emails_failed = report.emails_failed,
            "invoice expiry sweep finished"
        );
        Ok(report)
    }
}

/// Run `sweep` every `period` on the current runtime.
///
/// Returns `None` when `period` is zero, which disables the schedule. The
/// first sweep runs immediately. Failed runs are logged and the schedule
/// carries on.
pub fn spawn_expiry_schedule(
    sweep: Arc<dyn InvoiceExpirySweep>,
    period: Duration,
) -> Option<JoinHandle<()>> {
    if period.is_zero() {
        info!("invoice expiry schedule disabled");
        return None;
    }
    info!(period_secs = period.as_secs(), "invoice expiry schedule started");
    Some(tokio::spawn(run_expiry_schedule(sweep, period)))
}

async fn run_expiry_schedule(sweep: Arc<dyn InvoiceExpirySweep>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let trace_id = TraceId::generate();
        if let Err(err) = TraceId::scope(trace_id, sweep.run_sweep()).await {
            error!(%trace_id, code = ?err.code(), message = err.message(), "scheduled invoice expiry sweep failed");
        }
    }
}

#[cfg(test)]
#[path = "invoice_expiry_tests.rs"]
mod tests;
