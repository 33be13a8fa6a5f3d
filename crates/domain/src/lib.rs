//! Domain layer for the tenant admin backend.
//!
//! This crate contains:
//! - Resource models (companies, plans, SQL connections, templates, ...)
//! - Repository ports implemented by the persistence layer
//! - Resource services: validation, plan limits, tenant scoping, notifications

pub mod models;
pub mod repository;
pub mod services;
