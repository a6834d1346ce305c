//! Voltcart Core - Shared types library.
//!
//! Common domain types used by the Voltcart API server:
//! type-safe entity IDs, validated email addresses, and the order,
//! payment, and user-role enums with their transition rules.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. The optional `postgres` feature adds `sqlx` trait implementations
//! so the newtypes can be bound and decoded directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
