//! Order service.
//!
//! Owns checkout validation, order-number generation, and the status state
//! machine. Orders snapshot the submitted cart lines; after placement only
//! the status fields and the delivery-completion timestamp change.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use voltcart_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, UserId};

use crate::db::orders::{NewOrder, OrderFilter};
use crate::db::{CartRepository, OrderRepository, RepositoryError};
use crate::models::{CheckoutRequest, Order, OrderItem, UpdateOrderRequest, UpdateStatusRequest};

/// Delivery charge applied when the client doesn't supply one.
const DEFAULT_DELIVERY_CHARGE: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Order type recorded when the client doesn't supply one.
const DEFAULT_ORDER_TYPE: &str = "delivery";

/// Bounded retries for the order-number pre-check loop. The unique
/// constraint on `order_number` remains the real guarantee.
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Checkout payload failed validation.
    #[error("{0}")]
    Validation(String),

    /// Order does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// Requested status change is not allowed by the state machine.
    #[error("cannot change order status from {from} to {to}")]
    InvalidOrderTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Requested payment status change is not allowed.
    #[error("cannot change payment status from {from} to {to}")]
    InvalidPaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// The generated order number collided even after retries; the client
    /// should retry the checkout.
    #[error("order number collision, please retry")]
    NumberCollision,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Orders returned alongside their total count for paginated listings.
#[derive(Debug)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    carts: CartRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            carts: CartRepository::new(pool),
        }
    }

    /// Place an order from a checkout request.
    ///
    /// Validates the payload, snapshots the cart lines, computes totals,
    /// generates a unique order number, and clears the user's stored cart
    /// on success.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for missing/invalid fields,
    /// `OrderError::NumberCollision` if the number collides even after the
    /// insert retry, and `OrderError::Repository` on database failures.
    pub async fn checkout(
        &self,
        user_id: UserId,
        request: CheckoutRequest,
    ) -> Result<Order, OrderError> {
        let draft = validate_checkout(user_id, request)?;

        let order_number = self.generate_order_number().await?;
        let order = self
            .orders
            .insert(&draft.into_new_order(order_number))
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => OrderError::NumberCollision,
                other => OrderError::Repository(other),
            })?;

        // Post-checkout clear; a user without a stored cart is fine
        self.carts.delete_by_user(user_id).await?;

        Ok(order)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if it doesn't exist.
    pub async fn get(&self, id: OrderId) -> Result<Order, OrderError> {
        self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)
    }

    /// List orders matching `filter` with page/limit pagination (1-based).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: i64,
        limit: i64,
    ) -> Result<OrderPage, OrderError> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let offset = (page - 1) * limit;

        let orders = self.orders.list(filter, limit, offset).await?;
        let total = self.orders.count(filter).await?;

        Ok(OrderPage {
            orders,
            total,
            page,
            limit,
        })
    }

    /// List all orders of one user, newest first (no pagination).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_by_user(user_id).await?)
    }

    /// Find orders by customer phone number.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn find_by_phone(&self, phone: &str) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.find_by_phone(phone).await?)
    }

    /// Apply a status update, enforcing the state machine.
    ///
    /// When the order transitions to `delivered` the delivery-completion
    /// timestamp is stamped once; it is never overwritten afterwards.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order doesn't exist and
    /// `OrderError::InvalidOrderTransition` / `InvalidPaymentTransition`
    /// when the requested change is not allowed.
    pub async fn update_status(
        &self,
        id: OrderId,
        request: &UpdateStatusRequest,
    ) -> Result<Order, OrderError> {
        let current = self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)?;
        let next = resolve_status_update(&current, request)?;

        self.orders
            .update_status(id, next.order_status, next.payment_status, next.actual_delivery)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    /// Update the owner-editable contact and delivery fields.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order doesn't exist.
    pub async fn update_details(
        &self,
        id: OrderId,
        request: &UpdateOrderRequest,
    ) -> Result<Order, OrderError> {
        let current = self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)?;

        let customer_name = request
            .customer_name
            .as_deref()
            .unwrap_or(&current.customer_name);
        let customer_phone = request
            .customer_phone
            .as_deref()
            .unwrap_or(&current.customer_phone);
        let customer_email = request
            .customer_email
            .as_deref()
            .or(current.customer_email.as_deref());
        let delivery_address = request
            .delivery_address
            .as_deref()
            .unwrap_or(&current.delivery_address);
        let special_instructions = request
            .special_instructions
            .as_deref()
            .or(current.special_instructions.as_deref());
        let payment_method = request.payment_method.unwrap_or(current.payment_method);

        self.orders
            .update_details(
                id,
                customer_name,
                customer_phone,
                customer_email,
                delivery_address,
                special_instructions,
                payment_method,
            )
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    /// Delete an order (explicit admin/owner action).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if it doesn't exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), OrderError> {
        if self.orders.delete(id).await? {
            Ok(())
        } else {
            Err(OrderError::OrderNotFound)
        }
    }

    /// Generate a unique order number.
    ///
    /// Tries `ORD-<base36 timestamp>-<random>` up to a small bound, appending
    /// a disambiguating attempt suffix on collision, then falls back to a
    /// millisecond-timestamp plus random-integer scheme. The pre-check
    /// against the store only reduces insert retries; uniqueness is enforced
    /// by the storage constraint.
    async fn generate_order_number(&self) -> Result<String, OrderError> {
        let millis = timestamp_millis();

        for attempt in 0..ORDER_NUMBER_ATTEMPTS {
            let candidate = order_number_candidate(millis, random_suffix(), attempt);
            if !self.orders.order_number_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        let fallback: u32 = rand::rng().random_range(0..10_000);
        Ok(format!("ORD-{millis}-{fallback}"))
    }
}

// =============================================================================
// Pure checkout rules
// =============================================================================

/// A validated checkout, ready to be persisted once a number is assigned.
#[derive(Debug)]
struct OrderDraft {
    user_id: UserId,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    cart_items: Vec<OrderItem>,
    total_amount: Decimal,
    delivery_charges: Decimal,
    final_amount: Decimal,
    delivery_address: String,
    special_instructions: Option<String>,
    payment_method: PaymentMethod,
    order_type: String,
}

impl OrderDraft {
    fn into_new_order(self, order_number: String) -> NewOrder {
        NewOrder {
            user_id: self.user_id,
            order_number,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            cart_items: self.cart_items,
            total_amount: self.total_amount,
            delivery_charges: self.delivery_charges,
            final_amount: self.final_amount,
            delivery_address: self.delivery_address,
            special_instructions: self.special_instructions,
            payment_method: self.payment_method,
            order_type: self.order_type,
        }
    }
}

/// Validate a checkout request and compute its totals.
fn validate_checkout(
    user_id: UserId,
    request: CheckoutRequest,
) -> Result<OrderDraft, OrderError> {
    let required = |field: Option<String>, name: &str| -> Result<String, OrderError> {
        match field {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(OrderError::Validation(format!("{name} is required"))),
        }
    };

    let customer_name = required(request.customer_name, "customerName")?;
    let customer_phone = required(request.customer_phone, "customerPhone")?;
    let delivery_address = required(request.delivery_address, "deliveryAddress")?;

    if request.cart_items.is_empty() {
        return Err(OrderError::Validation("cartItems must not be empty".to_string()));
    }

    let mut cart_items = Vec::with_capacity(request.cart_items.len());
    for input in request.cart_items {
        let product_id = input
            .product_id
            .ok_or_else(|| OrderError::Validation("cart item productId is required".to_string()))?;
        let name = input
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| OrderError::Validation("cart item name is required".to_string()))?;
        let price = input
            .price
            .filter(|p| *p >= Decimal::ZERO)
            .ok_or_else(|| OrderError::Validation("cart item price is required".to_string()))?;
        let quantity = input.quantity.unwrap_or(1);
        if quantity == 0 {
            return Err(OrderError::Validation(
                "cart item quantity must be at least 1".to_string(),
            ));
        }

        cart_items.push(OrderItem {
            product_id,
            name,
            price,
            category: input.category,
            brand: input.brand,
            image: input.image,
            quantity,
            total_price: price * Decimal::from(quantity),
        });
    }

    let computed_total: Decimal = cart_items.iter().map(|i| i.total_price).sum();
    let total_amount = request.total_amount.unwrap_or(computed_total);
    if total_amount <= Decimal::ZERO {
        return Err(OrderError::Validation(
            "totalAmount must be positive".to_string(),
        ));
    }

    let delivery_charges = request.delivery_charges.unwrap_or(DEFAULT_DELIVERY_CHARGE);
    let final_amount = request
        .final_amount
        .unwrap_or(total_amount + delivery_charges);

    Ok(OrderDraft {
        user_id,
        customer_name,
        customer_phone,
        customer_email: request.customer_email,
        cart_items,
        total_amount,
        delivery_charges,
        final_amount,
        delivery_address,
        special_instructions: request.special_instructions,
        payment_method: request.payment_method.unwrap_or(PaymentMethod::Cash),
        order_type: request
            .order_type
            .unwrap_or_else(|| DEFAULT_ORDER_TYPE.to_string()),
    })
}

/// Resolved target of a status update.
#[derive(Debug, PartialEq, Eq)]
struct StatusUpdate {
    order_status: OrderStatus,
    payment_status: PaymentStatus,
    actual_delivery: Option<DateTime<Utc>>,
}

/// Validate a requested status change against the current order.
fn resolve_status_update(
    current: &Order,
    request: &UpdateStatusRequest,
) -> Result<StatusUpdate, OrderError> {
    let order_status = match request.order_status {
        Some(next) if next != current.order_status => {
            if !current.order_status.can_transition_to(next) {
                return Err(OrderError::InvalidOrderTransition {
                    from: current.order_status,
                    to: next,
                });
            }
            next
        }
        _ => current.order_status,
    };

    let payment_status = match request.payment_status {
        Some(next) if next != current.payment_status => {
            if !current.payment_status.can_transition_to(next) {
                return Err(OrderError::InvalidPaymentTransition {
                    from: current.payment_status,
                    to: next,
                });
            }
            next
        }
        _ => current.payment_status,
    };

    // Stamp delivery completion once, on the transition into delivered
    let actual_delivery = match (current.actual_delivery, order_status) {
        (Some(at), _) => Some(at),
        (None, OrderStatus::Delivered) => Some(Utc::now()),
        (None, _) => None,
    };

    Ok(StatusUpdate {
        order_status,
        payment_status,
        actual_delivery,
    })
}

/// Milliseconds since the Unix epoch, saturating at zero for pre-epoch clocks.
fn timestamp_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Format one order-number candidate.
///
/// The first attempt is `ORD-<base36 millis>-<random>`; later attempts carry
/// the attempt counter so retries within one millisecond still differ.
fn order_number_candidate(millis: u64, random: String, attempt: u32) -> String {
    if attempt == 0 {
        format!("ORD-{}-{random}", to_base36(millis))
    } else {
        format!("ORD-{}-{random}{attempt}", to_base36(millis))
    }
}

/// Four base36 characters of randomness.
fn random_suffix() -> String {
    to_base36_padded(rand::rng().random_range(0..36u64.pow(4)), 4)
}

/// Uppercase base36 representation of `n`.
fn to_base36(n: u64) -> String {
    to_base36_padded(n, 1)
}

fn to_base36_padded(mut n: u64, min_width: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    while out.len() < min_width {
        out.push(b'0');
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voltcart_core::ProductId;

    use crate::models::OrderItemInput;

    use super::*;

    fn item_input(id: i32, price: i64, quantity: u32) -> OrderItemInput {
        OrderItemInput {
            product_id: Some(ProductId::new(id)),
            name: Some(format!("Product {id}")),
            price: Some(Decimal::from(price)),
            category: None,
            brand: None,
            image: None,
            quantity: Some(quantity),
            total_price: None,
        }
    }

    fn checkout_request() -> CheckoutRequest {
        CheckoutRequest {
            customer_name: Some("Asha Verma".to_string()),
            customer_phone: Some("9876543210".to_string()),
            customer_email: None,
            cart_items: vec![item_input(1, 1000, 1)],
            total_amount: None,
            delivery_charges: None,
            final_amount: None,
            delivery_address: Some("12 Circuit Lane".to_string()),
            special_instructions: None,
            payment_method: None,
            order_type: None,
        }
    }

    fn placed_order(order_status: OrderStatus, payment_status: PaymentStatus) -> Order {
        Order {
            id: voltcart_core::OrderId::new(1),
            user_id: UserId::new(7),
            order_number: "ORD-TEST-0001".to_string(),
            customer_name: "Asha Verma".to_string(),
            customer_phone: "9876543210".to_string(),
            customer_email: None,
            cart_items: Vec::new(),
            total_amount: Decimal::from(1000),
            delivery_charges: Decimal::from(200),
            final_amount: Decimal::from(1200),
            delivery_address: "12 Circuit Lane".to_string(),
            special_instructions: None,
            payment_method: PaymentMethod::Cash,
            payment_status,
            order_status,
            order_type: "delivery".to_string(),
            actual_delivery: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_checkout_computes_default_charges() {
        let draft = validate_checkout(UserId::new(7), checkout_request()).unwrap();

        assert_eq!(draft.total_amount, Decimal::from(1000));
        assert_eq!(draft.delivery_charges, Decimal::from(200));
        assert_eq!(draft.final_amount, Decimal::from(1200));
        assert_eq!(draft.order_type, "delivery");
        assert_eq!(draft.payment_method, PaymentMethod::Cash);
    }

    #[test]
    fn test_checkout_recomputes_line_totals() {
        let mut request = checkout_request();
        request.cart_items = vec![item_input(1, 250, 3), item_input(2, 100, 1)];
        let draft = validate_checkout(UserId::new(7), request).unwrap();

        assert_eq!(draft.cart_items[0].total_price, Decimal::from(750));
        assert_eq!(draft.total_amount, Decimal::from(850));
    }

    #[test]
    fn test_checkout_respects_explicit_amounts() {
        let mut request = checkout_request();
        request.delivery_charges = Some(Decimal::ZERO);
        request.final_amount = Some(Decimal::from(950));
        let draft = validate_checkout(UserId::new(7), request).unwrap();

        assert_eq!(draft.delivery_charges, Decimal::ZERO);
        assert_eq!(draft.final_amount, Decimal::from(950));
    }

    #[test]
    fn test_checkout_rejects_missing_address() {
        let mut request = checkout_request();
        request.delivery_address = Some("   ".to_string());

        let err = validate_checkout(UserId::new(7), request).unwrap_err();
        assert!(matches!(err, OrderError::Validation(ref m) if m.contains("deliveryAddress")));
    }

    #[test]
    fn test_checkout_rejects_empty_cart() {
        let mut request = checkout_request();
        request.cart_items = Vec::new();

        let err = validate_checkout(UserId::new(7), request).unwrap_err();
        assert!(matches!(err, OrderError::Validation(ref m) if m.contains("cartItems")));
    }

    #[test]
    fn test_checkout_rejects_zero_quantity() {
        let mut request = checkout_request();
        request.cart_items = vec![item_input(1, 1000, 0)];

        let err = validate_checkout(UserId::new(7), request).unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[test]
    fn test_status_update_stamps_delivery_timestamp() {
        let order = placed_order(OrderStatus::Processing, PaymentStatus::Pending);
        let request = UpdateStatusRequest {
            order_status: Some(OrderStatus::Delivered),
            payment_status: None,
        };

        let update = resolve_status_update(&order, &request).unwrap();
        assert_eq!(update.order_status, OrderStatus::Delivered);
        assert!(update.actual_delivery.is_some());
    }

    #[test]
    fn test_status_update_rejects_backwards_transition() {
        let order = placed_order(OrderStatus::Processing, PaymentStatus::Pending);
        let request = UpdateStatusRequest {
            order_status: Some(OrderStatus::Confirmed),
            payment_status: None,
        };

        let err = resolve_status_update(&order, &request).unwrap_err();
        assert!(matches!(err, OrderError::InvalidOrderTransition { .. }));
    }

    #[test]
    fn test_status_update_rejects_leaving_terminal_state() {
        let order = placed_order(OrderStatus::Cancelled, PaymentStatus::Pending);
        let request = UpdateStatusRequest {
            order_status: Some(OrderStatus::Pending),
            payment_status: None,
        };

        assert!(resolve_status_update(&order, &request).is_err());
    }

    #[test]
    fn test_status_update_same_status_is_noop() {
        let order = placed_order(OrderStatus::Processing, PaymentStatus::Completed);
        let request = UpdateStatusRequest {
            order_status: None,
            payment_status: None,
        };

        let update = resolve_status_update(&order, &request).unwrap();
        assert_eq!(update.order_status, OrderStatus::Processing);
        assert_eq!(update.payment_status, PaymentStatus::Completed);
        assert!(update.actual_delivery.is_none());
    }

    #[test]
    fn test_payment_status_locked_once_completed() {
        let order = placed_order(OrderStatus::Processing, PaymentStatus::Completed);
        let request = UpdateStatusRequest {
            order_status: None,
            payment_status: Some(PaymentStatus::Failed),
        };

        let err = resolve_status_update(&order, &request).unwrap_err();
        assert!(matches!(err, OrderError::InvalidPaymentTransition { .. }));
    }

    #[test]
    fn test_order_number_shape() {
        let candidate = order_number_candidate(1_700_000_000_000, "A1B2".to_string(), 0);
        assert!(candidate.starts_with("ORD-"));
        assert_eq!(candidate.split('-').count(), 3);
        assert!(candidate.ends_with("A1B2"));
    }

    #[test]
    fn test_order_number_retry_suffix_differs() {
        let first = order_number_candidate(42, "ZZZZ".to_string(), 0);
        let second = order_number_candidate(42, "ZZZZ".to_string(), 1);
        assert_ne!(first, second);
    }

    #[test]
    fn test_base36_roundtrip_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36_padded(1, 4), "0001");
    }
}
