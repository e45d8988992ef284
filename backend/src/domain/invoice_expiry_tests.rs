//! Tests for the invoice expiry sweep and schedule.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Duration as ChronoDuration;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockInvoiceRepository, MockProfileRepository};
use crate::domain::test_fixtures::{fixture_timestamp, sample_invoice, sample_profile};
use crate::domain::{EmailAddress, ErrorCode, InvoiceStatus, Language, MemberId};
use crate::test_support::{
    InMemoryInvoiceRepository, InMemoryProfileRepository, MutableClock, RecordingEmailSender,
};

struct World {
    invoices: Arc<InMemoryInvoiceRepository>,
    profiles: Arc<InMemoryProfileRepository>,
    sender: RecordingEmailSender,
    clock: MutableClock,
}

impl World {
    fn service(&self) -> InvoiceExpiryService<InMemoryInvoiceRepository, InMemoryProfileRepository> {
        InvoiceExpiryService::new(
            Arc::clone(&self.invoices),
            Arc::clone(&self.profiles),
            Mailer::new(
                Arc::new(self.sender.clone()),
                EmailAddress::new("ops@example.com").expect("valid email"),
            ),
            Arc::new(self.clock.clone()),
        )
    }
}

#[fixture]
fn world() -> World {
    World {
        invoices: Arc::new(InMemoryInvoiceRepository::default()),
        profiles: Arc::new(InMemoryProfileRepository::default()),
        sender: RecordingEmailSender::default(),
        clock: MutableClock::new(fixture_timestamp() + ChronoDuration::hours(25)),
    }
}

#[rstest]
#[tokio::test]
async fn sweep_expires_only_overdue_unpaid_invoices(world: World) {
    let profile = sample_profile(Language::En);
    world.profiles.put(profile.clone());

    let overdue = sample_invoice(profile.id);
    let mut reviewing = sample_invoice(profile.id);
    reviewing.status = InvoiceStatus::PendingReview;
    let mut fresh = sample_invoice(profile.id);
    fresh.expires_at = fixture_timestamp() + ChronoDuration::hours(48);
    for invoice in [&overdue, &reviewing, &fresh] {
        world.invoices.put(invoice.clone());
    }

    let report = world.service().run_sweep().await.expect("sweep runs");

    assert_eq!(
        report,
        SweepReport {
            expired: 1,
            emails_sent: 1,
            emails_failed: 0,
        }
    );
    let status_of = |id| world.invoices.get(id).map(|inv| inv.status);
    assert_eq!(status_of(&overdue.id), Some(InvoiceStatus::Expired));
    assert_eq!(status_of(&reviewing.id), Some(InvoiceStatus::PendingReview));
    assert_eq!(status_of(&fresh.id), Some(InvoiceStatus::Unpaid));

    let sent = world.sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, profile.email);
    assert!(sent[0].subject.contains("has expired"));
}

#[rstest]
#[tokio::test]
async fn second_sweep_finds_nothing(world: World) {
    let profile = sample_profile(Language::Id);
    world.profiles.put(profile.clone());
    world.invoices.put(sample_invoice(profile.id));

    let service = world.service();
    let first = service.run_sweep().await.expect("first sweep");
    let second = service.run_sweep().await.expect("second sweep");

    assert_eq!(first.expired, 1);
    assert_eq!(second, SweepReport::default());
    assert_eq!(world.sender.sent().len(), 1);
}

#[rstest]
#[tokio::test]
async fn invoice_expiring_exactly_now_is_left_alone(world: World) {
    let profile = sample_profile(Language::En);
    world.profiles.put(profile.clone());
    let invoice = sample_invoice(profile.id);
    world.clock.set(invoice.expires_at);
    world.invoices.put(invoice.clone());

    let report = world.service().run_sweep().await.expect("sweep runs");

    assert_eq!(report.expired, 0);
    assert_eq!(
        world.invoices.get(&invoice.id).map(|inv| inv.status),
        Some(InvoiceStatus::Unpaid)
    );
}

#[rstest]
#[tokio::test]
async fn failed_and_unroutable_emails_are_counted(world: World) {
    let reachable = sample_profile(Language::En);
    let mut bouncing = sample_profile(Language::Id);
    bouncing.email = EmailAddress::new("bounce@example.com").expect("valid email");
    world.sender.fail_for(bouncing.email.clone());
    world.profiles.put(reachable.clone());
    world.profiles.put(bouncing.clone());

    world.invoices.put(sample_invoice(reachable.id));
    world.invoices.put(sample_invoice(bouncing.id));
    world.invoices.put(sample_invoice(MemberId::random()));

    let report = world.service().run_sweep().await.expect("sweep runs");

    assert_eq!(report.expired, 3);
    assert_eq!(report.emails_sent, 1);
    assert_eq!(report.emails_failed, 2);
}

#[rstest]
#[tokio::test]
async fn repository_failure_aborts_the_sweep() {
    let mut invoices = MockInvoiceRepository::new();
    invoices
        .expect_expire_unpaid_before()
        .return_once(|_| Err(crate::domain::ports::InvoiceRepositoryError::connection("down")));
    let mut profiles = MockProfileRepository::new();
    profiles.expect_find_by_id().times(0);

    let service = InvoiceExpiryService::new(
        Arc::new(invoices),
        Arc::new(profiles),
        Mailer::new(
            Arc::new(RecordingEmailSender::default()),
            EmailAddress::new("ops@example.com").expect("valid email"),
        ),
        Arc::new(MutableClock::new(fixture_timestamp())),
    );

    let err = service.run_sweep().await.expect_err("outage");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[derive(Default)]
struct CountingSweep {
    runs: AtomicUsize,
}

#[async_trait]
impl InvoiceExpirySweep for CountingSweep {
    async fn run_sweep(&self) -> Result<SweepReport, Error> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Err(Error::service_unavailable("database unavailable"))
    }
}

#[tokio::test]
async fn zero_period_disables_schedule() {
    let sweep: Arc<dyn InvoiceExpirySweep> = Arc::new(CountingSweep::default());
    assert!(spawn_expiry_schedule(sweep, Duration::ZERO).is_none());
}

#[tokio::test(start_paused = true)]
async fn schedule_keeps_running_after_failed_sweeps() {
    let sweep = Arc::new(CountingSweep::default());
    let handle = spawn_expiry_schedule(
        Arc::clone(&sweep) as Arc<dyn InvoiceExpirySweep>,
        Duration::from_secs(60),
    )
    .expect("schedule enabled");

    tokio::time::sleep(Duration::from_secs(150)).await;
    handle.abort();

    assert_eq!(sweep.runs.load(Ordering::SeqCst), 3);
}
