//! Order (checkout) domain and wire types.
//!
//! An order is an immutable snapshot taken at placement time: customer
//! contact fields, a copy of the cart lines decoupled from the live catalog,
//! computed totals, and a globally unique order number. After creation only
//! the status fields and the delivery-completion timestamp change.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use voltcart_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId};

/// One snapshotted product line within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
    pub total_price: Decimal,
}

/// A placed order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub cart_items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub delivery_charges: Decimal,
    pub final_amount: Decimal,
    pub delivery_address: String,
    pub special_instructions: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub order_type: String,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line as submitted in a checkout request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: Option<ProductId>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub image: Option<String>,
    pub quantity: Option<u32>,
    pub total_price: Option<Decimal>,
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    #[serde(default)]
    pub cart_items: Vec<OrderItemInput>,
    pub total_amount: Option<Decimal>,
    pub delivery_charges: Option<Decimal>,
    pub final_amount: Option<Decimal>,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub order_type: Option<String>,
}

/// Body of `PATCH /api/checkout/{id}/status` (partial update).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// Body of `PUT /api/checkout/{id}` (owner-editable fields only; the owning
/// user and the snapshot cannot be changed).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}
