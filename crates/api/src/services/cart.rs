//! Cart service.
//!
//! Owns the cart-merge rules: at most one line per product, quantities
//! accumulate on repeated adds, display fields and the unit price are always
//! re-read from the catalog, and every line total is recomputed as
//! `price * quantity` on every mutation.
//!
//! Concurrent mutations for the same user are last-write-wins: each mutation
//! persists the full item list. With one cart per user this is acceptable,
//! but it is a documented limitation rather than a guarantee.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use voltcart_core::{ProductId, UserId};

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::models::{Cart, CartItem, CartItemInput, CartSummary, Product};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Referenced product does not exist in the catalog.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Referenced product exists but is not currently for sale.
    #[error("product {0} is unavailable")]
    ProductUnavailable(ProductId),

    /// Quantity missing or below one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Item payload has no product reference.
    #[error("productId is required")]
    MissingProductId,

    /// The user has no cart.
    #[error("cart not found")]
    CartNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Get a user's cart, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the lookup fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Cart>, CartError> {
        Ok(self.carts.get_by_user(user_id).await?)
    }

    /// Replace the user's cart with the given items, creating it if absent.
    ///
    /// Duplicate product references in the payload are merged. Each line is
    /// re-enriched from the catalog before it is stored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` or `CartError::ProductUnavailable`
    /// if a referenced product cannot be sold, `CartError::InvalidQuantity`
    /// or `CartError::MissingProductId` on bad payloads, and
    /// `CartError::Repository` on database failures.
    pub async fn replace(
        &self,
        user_id: UserId,
        inputs: Vec<CartItemInput>,
    ) -> Result<Cart, CartError> {
        let mut items: Vec<CartItem> = Vec::with_capacity(inputs.len());
        for input in inputs {
            let item = self.resolve_item(&input).await?;
            merge_item(&mut items, item);
        }

        Ok(self.carts.upsert_items(user_id, &items).await?)
    }

    /// Add one item to the user's cart, creating the cart if absent.
    ///
    /// If the product is already in the cart its quantity is increased and
    /// the line total recomputed; otherwise a new line is appended.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CartService::replace`].
    pub async fn add_item(
        &self,
        user_id: UserId,
        input: CartItemInput,
    ) -> Result<Cart, CartError> {
        let item = self.resolve_item(&input).await?;

        let mut items = self
            .carts
            .get_by_user(user_id)
            .await?
            .map(|cart| cart.items)
            .unwrap_or_default();
        merge_item(&mut items, item);

        Ok(self.carts.upsert_items(user_id, &items).await?)
    }

    /// Remove a product's line from the user's cart.
    ///
    /// Removing a product that is not in the cart is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if the user has no cart.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Cart, CartError> {
        let cart = self
            .carts
            .get_by_user(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        let items: Vec<CartItem> = cart
            .items
            .into_iter()
            .filter(|item| item.product_id != product_id)
            .collect();

        self.carts
            .update_items(user_id, &items)
            .await?
            .ok_or(CartError::CartNotFound)
    }

    /// Delete the user's cart entirely.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if the user has no cart.
    pub async fn clear(&self, user_id: UserId) -> Result<(), CartError> {
        if self.carts.delete_by_user(user_id).await? {
            Ok(())
        } else {
            Err(CartError::CartNotFound)
        }
    }

    /// Aggregate totals for the user's cart.
    ///
    /// A user without a cart gets an all-zero summary rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the lookup fails.
    pub async fn summary(&self, user_id: UserId) -> Result<CartSummary, CartError> {
        let cart = self.carts.get_by_user(user_id).await?;
        Ok(summarize(user_id, cart.as_ref()))
    }

    /// List every cart, most recently updated first (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the lookup fails.
    pub async fn list_all(&self) -> Result<Vec<Cart>, CartError> {
        Ok(self.carts.list_all().await?)
    }

    /// Build a cart line from a client payload and the live catalog entry.
    ///
    /// The catalog is authoritative for price and display fields; whatever
    /// the client sent for those is discarded.
    async fn resolve_item(&self, input: &CartItemInput) -> Result<CartItem, CartError> {
        let product_id = input.product_id.ok_or(CartError::MissingProductId)?;
        let quantity = input.quantity.unwrap_or(1);
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;
        if !product.available {
            return Err(CartError::ProductUnavailable(product_id));
        }

        Ok(line_item(&product, quantity))
    }
}

// =============================================================================
// Pure cart rules
// =============================================================================

/// Build a cart line from a catalog entry.
fn line_item(product: &Product, quantity: u32) -> CartItem {
    CartItem {
        product_id: product.id,
        name: product.name.clone(),
        image: product.image.clone(),
        price: product.price,
        brand: product.brand.clone(),
        category: product.category.clone(),
        specifications: product.specifications.clone().unwrap_or_default(),
        quantity,
        total_price: product.price * Decimal::from(quantity),
    }
}

/// Merge a resolved line into an item list, accumulating quantity if the
/// product is already present and keeping at most one line per product.
fn merge_item(items: &mut Vec<CartItem>, new: CartItem) {
    if let Some(existing) = items.iter_mut().find(|i| i.product_id == new.product_id) {
        existing.quantity += new.quantity;
        // Refresh from the incoming line so a price change propagates
        existing.price = new.price;
        existing.name = new.name;
        existing.image = new.image;
        existing.brand = new.brand;
        existing.category = new.category;
        existing.specifications = new.specifications;
        existing.total_price = existing.price * Decimal::from(existing.quantity);
    } else {
        items.push(new);
    }
}

/// Compute aggregate totals over a cart (all zeros for a missing cart).
fn summarize(user_id: UserId, cart: Option<&Cart>) -> CartSummary {
    let items = cart.map(|c| c.items.as_slice()).unwrap_or_default();
    CartSummary {
        user_id,
        total_items: items.len(),
        total_quantity: items.iter().map(|i| i.quantity).sum(),
        total_amount: items.iter().map(|i| i.total_price).sum(),
        last_updated: cart.map(|c| c.updated_at),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use voltcart_core::{CartId, ProductId, UserId};

    use super::*;

    fn product(id: i32, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::from(price),
            category: "Electronics".to_string(),
            brand: "Volt".to_string(),
            specifications: None,
            image: "/images/default.png".to_string(),
            available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cart_with(items: Vec<CartItem>) -> Cart {
        Cart {
            id: CartId::new(1),
            user_id: UserId::new(7),
            items,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_item_computes_total() {
        let item = line_item(&product(1, 250), 3);
        assert_eq!(item.total_price, Decimal::from(750));
        assert_eq!(item.quantity, 3);
        assert_eq!(item.brand, "Volt");
    }

    #[test]
    fn test_merge_appends_new_product() {
        let mut items = vec![line_item(&product(1, 100), 1)];
        merge_item(&mut items, line_item(&product(2, 200), 2));

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].product_id, ProductId::new(2));
        assert_eq!(items[1].total_price, Decimal::from(400));
    }

    #[test]
    fn test_merge_accumulates_quantity_for_same_product() {
        let mut items = vec![line_item(&product(1, 100), 2)];
        merge_item(&mut items, line_item(&product(1, 100), 3));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
        assert_eq!(items[0].total_price, Decimal::from(500));
    }

    #[test]
    fn test_merge_refreshes_price_on_re_add() {
        // First added at 100, catalog price has since moved to 120
        let mut items = vec![line_item(&product(1, 100), 1)];
        merge_item(&mut items, line_item(&product(1, 120), 1));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, Decimal::from(120));
        assert_eq!(items[0].total_price, Decimal::from(240));
    }

    #[test]
    fn test_line_total_invariant_holds_after_merges() {
        let mut items = Vec::new();
        merge_item(&mut items, line_item(&product(1, 99), 1));
        merge_item(&mut items, line_item(&product(2, 45), 4));
        merge_item(&mut items, line_item(&product(1, 99), 2));

        for item in &items {
            assert_eq!(item.total_price, item.price * Decimal::from(item.quantity));
        }
    }

    #[test]
    fn test_summary_of_missing_cart_is_zero() {
        let summary = summarize(UserId::new(7), None);
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.total_quantity, 0);
        assert_eq!(summary.total_amount, Decimal::ZERO);
        assert!(summary.last_updated.is_none());
    }

    #[test]
    fn test_summary_aggregates_lines() {
        let cart = cart_with(vec![
            line_item(&product(1, 100), 2),
            line_item(&product(2, 50), 1),
        ]);
        let summary = summarize(cart.user_id, Some(&cart));

        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.total_amount, Decimal::from(250));
        assert!(summary.last_updated.is_some());
    }
}
