//! Outbound adapters implementing the domain's driven ports.
//!
//! - `persistence`: PostgreSQL repositories for profiles, invoices and
//!   withdrawals.
//! - `email`: transactional email delivery.

pub mod email;
pub mod persistence;
