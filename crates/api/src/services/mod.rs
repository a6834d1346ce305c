//! Business logic services.
//!
//! Services own the workflow rules (cart merging, checkout validation,
//! status transitions, credential handling) and drive the repositories in
//! `crate::db`. Route handlers stay thin: extract, call a service, map the
//! result to a response.

pub mod auth;
pub mod cart;
pub mod order;

pub use auth::AuthService;
pub use cart::CartService;
pub use order::OrderService;
