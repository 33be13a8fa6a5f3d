//! Request extractors.

pub mod auth;

pub use auth::{CurrentUser, Tenant, COMPANY_HEADER};
