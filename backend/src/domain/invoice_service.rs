//! Invoice domain service.
//!
//! Implements the invoice command and query driving ports. Every status
//! change is applied to the domain entity first and then written with a
//! compare-and-set on the previous status.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use super::codes::CodeGenerator;
use super::notification::{self, EmailMessage};
use super::notification_service::Mailer;
use super::port_error_mapping::{map_invoice_repository_error, map_profile_repository_error};
use super::ports::{
    CreateInvoiceRequest, InvoiceCommand, InvoiceQuery, InvoiceRepository,
    InvoiceRepositoryError, ProfileRepository,
};
use super::{
    Error, Invoice, InvoiceDraft, InvoiceId, InvoiceStatus, InvoiceTransitionError, MemberId,
    PricingConfig, PricingError, Profile, ProofUrl,
};

/// Attempts at drawing an unused invoice number before giving up.
const NUMBER_ATTEMPTS: usize = 3;

/// Tunables for invoice issuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceSettings {
    /// Stage price, exchange rate and minimum purchase.
    pub pricing: PricingConfig,
    /// Payment window.
    pub ttl: Duration,
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            ttl: Duration::hours(24),
        }
    }
}

/// Driven dependencies of [`InvoiceService`].
pub struct InvoiceServicePorts<I, P> {
    /// Invoice storage.
    pub invoices: Arc<I>,
    /// Profile storage, for email recipients.
    pub profiles: Arc<P>,
    /// Email delivery.
    pub mailer: Mailer,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Invoice number source.
    pub codes: Arc<dyn CodeGenerator>,
}

/// Invoice service implementing [`InvoiceCommand`] and [`InvoiceQuery`].
#[derive(Clone)]
pub struct InvoiceService<I, P> {
    invoices: Arc<I>,
    profiles: Arc<P>,
    mailer: Mailer,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeGenerator>,
    settings: InvoiceSettings,
}

fn map_pricing_error(error: PricingError) -> Error {
    let code = match error {
        PricingError::Misconfigured => return Error::internal("invoice pricing is not configured"),
        PricingError::NonPositiveAmount => "non_positive_amount",
        PricingError::BelowMinimum { .. } => "below_minimum",
        PricingError::ZeroTokens => "zero_tokens",
        PricingError::AmountTooLarge => "amount_too_large",
    };
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": "amount",
        "code": code,
    }))
}

fn map_transition_error(error: InvoiceTransitionError) -> Error {
    match &error {
        InvoiceTransitionError::InvalidState { from, .. } => Error::conflict(error.to_string())
            .with_details(json!({ "status": from.as_str() })),
        InvoiceTransitionError::PastExpiry { .. } | InvoiceTransitionError::NotYetDue { .. } => {
            Error::conflict(error.to_string())
        }
    }
}

fn invoice_not_found(id: &InvoiceId) -> Error {
    Error::not_found(format!("invoice {id} not found"))
}

impl<I, P> InvoiceService<I, P> {
    /// Create the service.
    pub fn new(ports: InvoiceServicePorts<I, P>, settings: InvoiceSettings) -> Self {
        Self {
            invoices: ports.invoices,
            profiles: ports.profiles,
            mailer: ports.mailer,
            clock: ports.clock,
            codes: ports.codes,
            settings,
        }
    }
}

impl<I, P> InvoiceService<I, P>
where
    I: InvoiceRepository,
    P: ProfileRepository,
{
    async fn load(&self, id: &InvoiceId) -> Result<Invoice, Error> {
        self.invoices
            .find_by_id(id)
            .await
            .map_err(map_invoice_repository_error)?
            .ok_or_else(|| invoice_not_found(id))
    }

    async fn load_owned(&self, member: &MemberId, id: &InvoiceId) -> Result<Invoice, Error> {
        let invoice = self.load(id).await?;
        if invoice.member_id != *member {
            return Err(invoice_not_found(id));
        }
        Ok(invoice)
    }

    async fn apply<F>(&self, mut invoice: Invoice, change: F) -> Result<Invoice, Error>
    where
        F: FnOnce(&mut Invoice) -> Result<(), InvoiceTransitionError> + Send,
    {
        let expected = invoice.status;
        change(&mut invoice).map_err(map_transition_error)?;
        let stored = self
            .invoices
            .update_status(&invoice, expected)
            .await
            .map_err(map_invoice_repository_error)?;
        if !stored {
            return Err(Error::conflict("invoice changed while it was being updated")
                .with_details(json!({ "expectedStatus": expected.as_str() })));
        }
        info!(
            invoice_id = %invoice.id,
            from = expected.as_str(),
            to = invoice.status.as_str(),
            "invoice status changed"
        );
        Ok(invoice)
    }

    async fn owner(&self, invoice: &Invoice) -> Option<Profile> {
        match self.profiles.find_by_id(&invoice.member_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                warn!(invoice_id = %invoice.id, "invoice owner profile missing");
                None
            }
            Err(error) => {
                warn!(invoice_id = %invoice.id, %error, "invoice owner lookup failed");
                None
            }
        }
    }

    async fn email_owner(
        &self,
        invoice: &Invoice,
        render: fn(&Profile, &Invoice) -> EmailMessage,
        purpose: &'static str,
    ) {
        if let Some(profile) = self.owner(invoice).await {
            self.mailer
                .send_best_effort(&render(&profile, invoice), purpose)
                .await;
        }
    }

    async fn insert_with_fresh_number(
        &self,
        member: &MemberId,
        request: CreateInvoiceRequest,
    ) -> Result<Invoice, Error> {
        let quote = self
            .settings
            .pricing
            .quote(request.currency, request.amount)
            .map_err(map_pricing_error)?;
        let now = self.clock.utc();

        for attempt in 1..=NUMBER_ATTEMPTS {
            let invoice = Invoice::issue(InvoiceDraft {
                id: InvoiceId::random(),
                number: self.codes.invoice_number(now),
                member_id: *member,
                quote,
                created_at: now,
                ttl: self.settings.ttl,
            });
            match self.invoices.insert(&invoice).await {
                Ok(()) => return Ok(invoice),
                Err(InvoiceRepositoryError::DuplicateNumber { number }) => {
                    warn!(attempt, %number, "invoice number collided; drawing another");
                }
                Err(other) => return Err(map_invoice_repository_error(other)),
            }
        }
        Err(Error::internal("could not allocate a unique invoice number"))
    }
}

#[async_trait]
impl<I, P> InvoiceCommand for InvoiceService<I, P>
where
    I: InvoiceRepository,
    P: ProfileRepository,
{
    async fn create_invoice(
        &self,
        member: &MemberId,
        request: CreateInvoiceRequest,
    ) -> Result<Invoice, Error> {
        let profile = self
            .profiles
            .find_by_id(member)
            .await
            .map_err(map_profile_repository_error)?
            .ok_or_else(|| Error::unauthorized("member profile not found"))?;

        let invoice = self.insert_with_fresh_number(member, request).await?;
        info!(
            invoice_id = %invoice.id,
            number = %invoice.number,
            currency = invoice.currency.as_str(),
            tpc_amount = invoice.tpc_amount,
            "invoice created"
        );
        self.mailer
            .send_best_effort(
                &notification::invoice_created(&profile, &invoice),
                "invoice_created",
            )
            .await;
        Ok(invoice)
    }

    async fn submit_proof(
        &self,
        member: &MemberId,
        invoice: &InvoiceId,
        proof_url: String,
    ) -> Result<Invoice, Error> {
        let proof = ProofUrl::new(&proof_url).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "proofUrl" }))
        })?;
        let current = self.load_owned(member, invoice).await?;
        let now = self.clock.utc();
        let updated = self
            .apply(current, |inv| inv.submit_proof(&proof, now))
            .await?;

        if let Some(profile) = self.owner(&updated).await {
            let message =
                notification::admin_proof_submitted(self.mailer.admin(), &profile, &updated);
            self.mailer
                .send_best_effort(&message, "admin_proof_submitted")
                .await;
        }
        Ok(updated)
    }

    async fn cancel_invoice(
        &self,
        member: &MemberId,
        invoice: &InvoiceId,
    ) -> Result<Invoice, Error> {
        let current = self.load_owned(member, invoice).await?;
        self.apply(current, Invoice::cancel).await
    }

    async fn admin_approve(&self, admin: &MemberId, invoice: &InvoiceId) -> Result<Invoice, Error> {
        let current = self.load(invoice).await?;
        let now = self.clock.utc();
        let admin = *admin;
        let updated = self
            .apply(current, move |inv| inv.approve(admin, now))
            .await?;
        self.email_owner(&updated, notification::invoice_paid, "invoice_paid")
            .await;
        Ok(updated)
    }

    async fn admin_reject(&self, admin: &MemberId, invoice: &InvoiceId) -> Result<Invoice, Error> {
        let current = self.load(invoice).await?;
        let admin = *admin;
        self.apply(current, move |inv| inv.reject(admin)).await
    }

    async fn admin_cancel(&self, admin: &MemberId, invoice: &InvoiceId) -> Result<Invoice, Error> {
        let current = self.load(invoice).await?;
        let updated = self.apply(current, Invoice::cancel).await?;
        info!(invoice_id = %updated.id, admin_id = %admin, "invoice cancelled by admin");
        Ok(updated)
    }
}

#[async_trait]
impl<I, P> InvoiceQuery for InvoiceService<I, P>
where
    I: InvoiceRepository,
    P: ProfileRepository,
{
    async fn list_member_invoices(&self, member: &MemberId) -> Result<Vec<Invoice>, Error> {
        self.invoices
            .list_for_member(member)
            .await
            .map_err(map_invoice_repository_error)
    }

    async fn get_invoice(&self, member: &MemberId, invoice: &InvoiceId) -> Result<Invoice, Error> {
        self.load_owned(member, invoice).await
    }

    async fn admin_list_invoices(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, Error> {
        self.invoices
            .list(status)
            .await
            .map_err(map_invoice_repository_error)
    }
}

#[cfg(test)]
#[path = "invoice_service_tests.rs"]
mod tests;
