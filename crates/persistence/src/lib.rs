//! Persistence layer for the tenant admin backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - PostgreSQL repository implementations of the domain ports
//! - An in-memory repository backend for development and tests

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;
