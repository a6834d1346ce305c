//! Product catalog types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use voltcart_core::ProductId;

/// A catalog entry.
///
/// The catalog price is the single source of truth for value calculations;
/// cart lines denormalize it but are re-read from here when items are added.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    /// e.g. "Laptop", "GPU", "RAM"
    pub category: String,
    /// e.g. "Dell", "NVIDIA"
    pub brand: String,
    pub specifications: Option<String>,
    pub image: String,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
