//! HTTP inbound adapter exposing REST endpoints.
//!
//! Member and admin routes live under `/api/v1` behind the session cookie;
//! the service-key protected function routes live under `/functions/v1`.

use actix_web::web;

pub mod admin;
pub mod auth;
pub mod dto;
pub mod error;
pub mod functions;
pub mod health;
pub mod invoices;
pub mod members;
pub mod paths;
pub mod schemas;
pub mod service_key;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod withdrawals;

pub use error::ApiResult;

/// Register every `/api/v1` handler on a scope or app.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use tpc_backend::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(members::signup)
        .service(members::login)
        .service(members::logout)
        .service(members::current_profile)
        .service(members::update_language)
        .service(members::list_referrals)
        .service(members::dashboard)
        .service(invoices::create_invoice)
        .service(invoices::list_invoices)
        .service(invoices::get_invoice)
        .service(invoices::submit_proof)
        .service(invoices::cancel_invoice)
        .service(withdrawals::request_withdrawal)
        .service(withdrawals::list_withdrawals)
        .service(admin::list_invoices)
        .service(admin::approve_invoice)
        .service(admin::reject_invoice)
        .service(admin::cancel_invoice)
        .service(admin::list_withdrawals)
        .service(admin::review_withdrawal)
        .service(paths::normalize);
}
