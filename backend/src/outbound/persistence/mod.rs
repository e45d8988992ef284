//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL through `diesel-async` and a `bb8` connection pool.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Business rules stay in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Atomic transitions**: status changes are compare-and-set updates, and
//!   the expiry sweep is a single `UPDATE … RETURNING`.
//!
//! # Example
//!
//! ```ignore
//! use tpc_backend::outbound::persistence::{DbPool, DieselInvoiceRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/tpc")).await?;
//! let invoices = DieselInvoiceRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_invoice_repository;
mod diesel_profile_repository;
mod diesel_withdrawal_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_invoice_repository::DieselInvoiceRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_withdrawal_repository::DieselWithdrawalRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
