//! Builders that wire repositories into services and services into HTTP
//! state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use tpc_backend::domain::ports::{
    FixtureInvoiceRepository, FixtureProfileRepository, FixtureWithdrawalRepository,
    InvoiceExpirySweep, InvoiceRepository, ProfileRepository, WithdrawalRepository,
};
use tpc_backend::domain::{
    CodeGenerator, InvoiceExpiryService, InvoiceService, InvoiceServicePorts, InvoiceSettings,
    Mailer, MemberService, NotificationService, RandomCodeGenerator, WithdrawalService,
};
use tpc_backend::inbound::http::state::HttpStatePorts;
use tpc_backend::outbound::persistence::{
    DbPool, DieselInvoiceRepository, DieselProfileRepository, DieselWithdrawalRepository,
};

/// Shared collaborators handed to every service.
#[derive(Clone)]
pub(crate) struct ServiceDeps {
    pub(crate) mailer: Mailer,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) codes: Arc<dyn CodeGenerator>,
    pub(crate) invoice_settings: InvoiceSettings,
}

impl ServiceDeps {
    /// Production collaborators: wall clock and random codes.
    pub(crate) fn new(mailer: Mailer, invoice_settings: InvoiceSettings) -> Self {
        Self {
            mailer,
            clock: Arc::new(DefaultClock),
            codes: Arc::new(RandomCodeGenerator),
            invoice_settings,
        }
    }
}

/// Wire every driving port over one set of repositories.
pub(crate) fn build_ports<P, I, W>(
    profiles: Arc<P>,
    invoices: Arc<I>,
    withdrawals: Arc<W>,
    deps: ServiceDeps,
) -> HttpStatePorts
where
    P: ProfileRepository + 'static,
    I: InvoiceRepository + 'static,
    W: WithdrawalRepository + 'static,
{
    let ServiceDeps {
        mailer,
        clock,
        codes,
        invoice_settings,
    } = deps;

    let members = Arc::new(MemberService::new(
        profiles.clone(),
        invoices.clone(),
        clock.clone(),
        codes.clone(),
    ));
    let invoice_service = Arc::new(InvoiceService::new(
        InvoiceServicePorts {
            invoices: invoices.clone(),
            profiles: profiles.clone(),
            mailer: mailer.clone(),
            clock: clock.clone(),
            codes,
        },
        invoice_settings,
    ));
    let withdrawal_service = Arc::new(WithdrawalService::new(
        withdrawals,
        profiles.clone(),
        mailer.clone(),
        clock.clone(),
    ));
    let expiry: Arc<dyn InvoiceExpirySweep> = Arc::new(InvoiceExpiryService::new(
        invoices.clone(),
        profiles.clone(),
        mailer.clone(),
        clock,
    ));
    let notifications = Arc::new(NotificationService::new(invoices, profiles, mailer));

    HttpStatePorts {
        members: members.clone(),
        member_query: members,
        invoices: invoice_service.clone(),
        invoice_query: invoice_service,
        withdrawals: withdrawal_service.clone(),
        withdrawal_query: withdrawal_service,
        expiry,
        notifications,
    }
}

/// Diesel-backed ports when a pool is available, fixtures otherwise.
pub(crate) fn build_http_ports(pool: Option<&DbPool>, deps: ServiceDeps) -> HttpStatePorts {
    match pool {
        Some(pool) => build_ports(
            Arc::new(DieselProfileRepository::new(pool.clone())),
            Arc::new(DieselInvoiceRepository::new(pool.clone())),
            Arc::new(DieselWithdrawalRepository::new(pool.clone())),
            deps,
        ),
        None => build_ports(
            Arc::new(FixtureProfileRepository),
            Arc::new(FixtureInvoiceRepository),
            Arc::new(FixtureWithdrawalRepository),
            deps,
        ),
    }
}
