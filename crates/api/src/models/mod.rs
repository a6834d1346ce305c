//! Domain and wire types.
//!
//! Domain types are what the services and repositories pass around; the
//! request/response types serialize with camelCase field names to match the
//! frontend contract.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem, CartItemInput, CartSummary};
pub use order::{
    CheckoutRequest, Order, OrderItem, OrderItemInput, UpdateOrderRequest, UpdateStatusRequest,
};
pub use product::Product;
pub use user::{User, UserProfile};
