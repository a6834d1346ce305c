//! Core types for Voltcart.
//!
//! Type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use status::{InvalidStatus, OrderStatus, PaymentMethod, PaymentStatus, Role};
