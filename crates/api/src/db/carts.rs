//! Cart repository.
//!
//! Each user has at most one `carts` row (unique `user_id`), holding the
//! line items as a JSONB document. Every mutation writes the full item list;
//! the replace-or-create path is a single `INSERT .. ON CONFLICT DO UPDATE`
//! so no read-then-write window exists for the bulk upsert.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use voltcart_core::{CartId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartItem};

#[derive(sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: i32,
    items: Json<Vec<CartItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user_id: UserId::new(row.user_id),
            items: row.items.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CART_COLUMNS: &str = "id, user_id, items, created_at, updated_at";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row: Option<CartRow> = sqlx::query_as(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    /// Replace the user's item list, creating the cart if absent.
    ///
    /// This is one atomic conditional write; concurrent upserts for the same
    /// user serialize on the unique `user_id` constraint.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_items(
        &self,
        user_id: UserId,
        items: &[CartItem],
    ) -> Result<Cart, RepositoryError> {
        let row: CartRow = sqlx::query_as(&format!(
            "INSERT INTO carts (user_id, items)
             VALUES ($1, $2)
             ON CONFLICT (user_id)
             DO UPDATE SET items = EXCLUDED.items, updated_at = NOW()
             RETURNING {CART_COLUMNS}"
        ))
        .bind(user_id)
        .bind(Json(items))
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace the item list of an existing cart.
    ///
    /// Returns `None` if the user has no cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_items(
        &self,
        user_id: UserId,
        items: &[CartItem],
    ) -> Result<Option<Cart>, RepositoryError> {
        let row: Option<CartRow> = sqlx::query_as(&format!(
            "UPDATE carts SET items = $2, updated_at = NOW()
             WHERE user_id = $1
             RETURNING {CART_COLUMNS}"
        ))
        .bind(user_id)
        .bind(Json(items))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    /// Delete a user's cart.
    ///
    /// Returns `true` if a cart existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_by_user(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all carts, most recently updated first (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Cart>, RepositoryError> {
        let rows: Vec<CartRow> = sqlx::query_as(&format!(
            "SELECT {CART_COLUMNS} FROM carts ORDER BY updated_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Cart::from).collect())
    }
}
