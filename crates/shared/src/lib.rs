//! Shared utilities and common types for the tenant admin backend.
//!
//! This crate provides functionality used across all other crates:
//! - Hashing, HMAC signing and secret generation
//! - Password hashing with Argon2id
//! - Access token issuing and validation
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
