//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod email_sender;
mod invoice_command;
mod invoice_expiry_sweep;
mod invoice_query;
mod invoice_repository;
mod member_account;
mod member_query;
mod notification_command;
mod profile_repository;
mod withdrawal_command;
mod withdrawal_repository;

#[cfg(test)]
pub use email_sender::MockEmailSender;
pub use email_sender::{EmailSender, EmailSenderError, FixtureEmailSender};
#[cfg(test)]
pub use invoice_command::MockInvoiceCommand;
pub use invoice_command::{CreateInvoiceRequest, InvoiceCommand};
#[cfg(test)]
pub use invoice_expiry_sweep::MockInvoiceExpirySweep;
pub use invoice_expiry_sweep::{FixtureInvoiceExpirySweep, InvoiceExpirySweep, SweepReport};
#[cfg(test)]
pub use invoice_query::MockInvoiceQuery;
pub use invoice_query::InvoiceQuery;
#[cfg(test)]
pub use invoice_repository::MockInvoiceRepository;
pub use invoice_repository::{
    FixtureInvoiceRepository, InvoiceRepository, InvoiceRepositoryError,
};
#[cfg(test)]
pub use member_account::MockMemberAccount;
pub use member_account::MemberAccount;
#[cfg(test)]
pub use member_query::MockMemberQuery;
pub use member_query::{DashboardSummary, InvoiceCounts, MemberQuery};
#[cfg(test)]
pub use notification_command::MockNotificationCommand;
pub use notification_command::NotificationCommand;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{
    FixtureProfileRepository, ProfileRepository, ProfileRepositoryError,
};
#[cfg(test)]
pub use withdrawal_command::{MockWithdrawalCommand, MockWithdrawalQuery};
pub use withdrawal_command::{WithdrawalCommand, WithdrawalQuery, WithdrawalRequest};
#[cfg(test)]
pub use withdrawal_repository::MockWithdrawalRepository;
pub use withdrawal_repository::{
    FixtureWithdrawalRepository, WithdrawalRepository, WithdrawalRepositoryError,
};
