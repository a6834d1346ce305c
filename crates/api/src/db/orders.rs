//! Order (checkout) repository.
//!
//! Orders are written once with their snapshot and order number; afterwards
//! only status fields, contact/delivery details, and the delivery timestamp
//! are updated. The unique constraint on `order_number` is the authoritative
//! guard against generation races.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, QueryBuilder};

use voltcart_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    order_number: String,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    cart_items: Json<Vec<OrderItem>>,
    total_amount: Decimal,
    delivery_charges: Decimal,
    final_amount: Decimal,
    delivery_address: String,
    special_instructions: Option<String>,
    payment_method: String,
    payment_status: String,
    order_status: String,
    order_type: String,
    actual_delivery: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let corrupt = |e: voltcart_core::InvalidStatus| {
            RepositoryError::DataCorruption(format!("bad status in database: {e}"))
        };

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            order_number: self.order_number,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            cart_items: self.cart_items.0,
            total_amount: self.total_amount,
            delivery_charges: self.delivery_charges,
            final_amount: self.final_amount,
            delivery_address: self.delivery_address,
            special_instructions: self.special_instructions,
            payment_method: self.payment_method.parse().map_err(corrupt)?,
            payment_status: self.payment_status.parse().map_err(corrupt)?,
            order_status: self.order_status.parse().map_err(corrupt)?,
            order_type: self.order_type,
            actual_delivery: self.actual_delivery,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, order_number, customer_name, customer_phone, \
     customer_email, cart_items, total_amount, delivery_charges, final_amount, \
     delivery_address, special_instructions, payment_method, payment_status, \
     order_status, order_type, actual_delivery, created_at, updated_at";

/// Fields for inserting a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
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
    pub order_type: String,
}

/// Filters for order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub user_id: Option<UserId>,
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderFilter {
    fn apply<'q>(&self, qb: &mut QueryBuilder<'q, sqlx::Postgres>) {
        if let Some(user_id) = self.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(status) = self.order_status {
            qb.push(" AND order_status = ").push_bind(status.to_string());
        }
        if let Some(status) = self.payment_status {
            qb.push(" AND payment_status = ").push_bind(status.to_string());
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Check whether an order number is already taken.
    ///
    /// This pre-check only reduces insert retries; the unique constraint is
    /// the actual correctness mechanism.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn order_number_exists(&self, order_number: &str) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM checkouts WHERE order_number = $1)")
                .bind(order_number)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Insert a new order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number collides.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let row: OrderRow = sqlx::query_as(&format!(
            "INSERT INTO checkouts (user_id, order_number, customer_name, customer_phone,
                 customer_email, cart_items, total_amount, delivery_charges, final_amount,
                 delivery_address, special_instructions, payment_method, order_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.user_id)
        .bind(&order.order_number)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_email)
        .bind(Json(&order.cart_items))
        .bind(order.total_amount)
        .bind(order.delivery_charges)
        .bind(order.final_amount)
        .bind(&order.delivery_address)
        .bind(&order.special_instructions)
        .bind(order.payment_method.to_string())
        .bind(&order.order_type)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "order number already exists"))?;

        row.into_order()
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM checkouts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// List orders matching `filter`, newest first, with pagination.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {ORDER_COLUMNS} FROM checkouts WHERE TRUE"
        ));
        filter.apply(&mut qb);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(self.pool).await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Count orders matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &OrderFilter) -> Result<i64, RepositoryError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM checkouts WHERE TRUE");
        filter.apply(&mut qb);

        let (count,): (i64,) = qb.build_query_as().fetch_one(self.pool).await?;

        Ok(count)
    }

    /// List all orders of one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM checkouts WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Write the status fields resolved by the service.
    ///
    /// Returns `None` if the order doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        order_status: OrderStatus,
        payment_status: PaymentStatus,
        actual_delivery: Option<DateTime<Utc>>,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE checkouts
             SET order_status = $2, payment_status = $3, actual_delivery = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(order_status.to_string())
        .bind(payment_status.to_string())
        .bind(actual_delivery)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Write the contact and delivery fields resolved by the service.
    ///
    /// Returns `None` if the order doesn't exist. The owning user, the
    /// snapshot, and the totals are deliberately not writable here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_details(
        &self,
        id: OrderId,
        customer_name: &str,
        customer_phone: &str,
        customer_email: Option<&str>,
        delivery_address: &str,
        special_instructions: Option<&str>,
        payment_method: PaymentMethod,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE checkouts
             SET customer_name = $2, customer_phone = $3, customer_email = $4,
                 delivery_address = $5, special_instructions = $6, payment_method = $7,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(customer_name)
        .bind(customer_phone)
        .bind(customer_email)
        .bind(delivery_address)
        .bind(special_instructions)
        .bind(payment_method.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Delete an order.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM checkouts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find orders by customer phone number, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_phone(&self, phone: &str) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM checkouts WHERE customer_phone = $1
             ORDER BY created_at DESC"
        ))
        .bind(phone)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }
}
