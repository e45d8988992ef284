//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    InvoiceCommand, InvoiceExpirySweep, InvoiceQuery, MemberAccount, MemberQuery,
    NotificationCommand, WithdrawalCommand, WithdrawalQuery,
};

use super::service_key::ServiceKey;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub members: Arc<dyn MemberAccount>,
    pub member_query: Arc<dyn MemberQuery>,
    pub invoices: Arc<dyn InvoiceCommand>,
    pub invoice_query: Arc<dyn InvoiceQuery>,
    pub withdrawals: Arc<dyn WithdrawalCommand>,
    pub withdrawal_query: Arc<dyn WithdrawalQuery>,
    pub expiry: Arc<dyn InvoiceExpirySweep>,
    pub notifications: Arc<dyn NotificationCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub members: Arc<dyn MemberAccount>,
    pub member_query: Arc<dyn MemberQuery>,
    pub invoices: Arc<dyn InvoiceCommand>,
    pub invoice_query: Arc<dyn InvoiceQuery>,
    pub withdrawals: Arc<dyn WithdrawalCommand>,
    pub withdrawal_query: Arc<dyn WithdrawalQuery>,
    pub expiry: Arc<dyn InvoiceExpirySweep>,
    pub notifications: Arc<dyn NotificationCommand>,
    /// Bearer key guarding `/functions/v1`; `None` rejects every call.
    pub service_key: Option<ServiceKey>,
}

impl HttpState {
    /// Construct state from the ports bundle and the function-route key.
    pub fn new(ports: HttpStatePorts, service_key: Option<ServiceKey>) -> Self {
        let HttpStatePorts {
            members,
            member_query,
            invoices,
            invoice_query,
            withdrawals,
            withdrawal_query,
            expiry,
            notifications,
        } = ports;
        Self {
            members,
            member_query,
            invoices,
            invoice_query,
            withdrawals,
            withdrawal_query,
            expiry,
            notifications,
            service_key,
        }
    }
}
