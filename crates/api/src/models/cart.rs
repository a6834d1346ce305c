//! Cart domain and wire types.
//!
//! A cart is one document per user: an ordered list of line items persisted
//! as a whole on every mutation. Line items denormalize product display
//! fields so the frontend can render the cart without extra catalog lookups.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use voltcart_core::{CartId, ProductId, UserId};

/// One product line within a cart.
///
/// Invariant: `total_price == price * quantity` after every mutation, and at
/// most one line exists per `product_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub price: Decimal,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub specifications: String,
    pub quantity: u32,
    pub total_price: Decimal,
}

/// A user's cart (exactly one per user).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item as submitted by the client.
///
/// Only the product reference and quantity are strictly required on the bulk
/// surface; display fields and totals are filled in during normalization.
/// `add-item` requires name, image, and price as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_id: Option<ProductId>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub price: Option<Decimal>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub specifications: Option<String>,
    pub quantity: Option<u32>,
    pub total_price: Option<Decimal>,
}

/// Aggregates over a cart for the summary endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub user_id: UserId,
    /// Number of distinct line items.
    pub total_items: usize,
    /// Sum of line totals.
    pub total_amount: Decimal,
    /// Sum of quantities across lines.
    pub total_quantity: u32,
    /// `None` when the user has no cart yet.
    pub last_updated: Option<DateTime<Utc>>,
}
