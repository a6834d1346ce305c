//! Cart route handlers.
//!
//! All cart routes require authentication. Cross-user access (the
//! `{userId}` variants) is allowed only for the owner or an admin and is
//! rejected with a uniform 403 otherwise.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use voltcart_core::{ProductId, UserId};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Cart, CartItemInput};
use crate::services::CartService;
use crate::state::AppState;

/// Body of `POST /api/cart` and `PUT /api/cart`.
#[derive(Debug, Deserialize)]
pub struct ReplaceCartRequest {
    #[serde(default)]
    pub items: Vec<CartItemInput>,
}

fn cart_json(cart: &Cart) -> Json<Value> {
    Json(json!({ "success": true, "cart": cart }))
}

/// `GET /api/cart`
pub async fn show_own(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Value>> {
    get_cart(&state, user.id).await
}

/// `GET /api/cart/{userId}` (owner or admin)
pub async fn show_user(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Value>> {
    if !user.can_access(user_id) {
        return Err(AppError::Forbidden);
    }
    get_cart(&state, user_id).await
}

async fn get_cart(state: &AppState, user_id: UserId) -> Result<Json<Value>> {
    let cart = CartService::new(state.pool())
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

    Ok(cart_json(&cart))
}

/// `POST /api/cart` / `PUT /api/cart`
///
/// Bulk item-list replacement, used by the client to re-submit a cart after
/// reconciling prices against the live catalog.
pub async fn replace(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ReplaceCartRequest>,
) -> Result<Json<Value>> {
    let cart = CartService::new(state.pool())
        .replace(user.id, body.items)
        .await?;

    Ok(cart_json(&cart))
}

/// `POST /api/cart/add-item`
pub async fn add_item(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(item): Json<CartItemInput>,
) -> Result<Json<Value>> {
    let cart = CartService::new(state.pool()).add_item(user.id, item).await?;

    Ok(cart_json(&cart))
}

/// `DELETE /api/cart/remove-item/{productId}`
pub async fn remove_item(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Value>> {
    let cart = CartService::new(state.pool())
        .remove_item(user.id, product_id)
        .await?;

    Ok(cart_json(&cart))
}

/// `DELETE /api/cart`
pub async fn clear_own(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Value>> {
    clear_cart(&state, user.id).await
}

/// `DELETE /api/cart/{userId}` (owner or admin)
pub async fn clear_user(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Value>> {
    if !user.can_access(user_id) {
        return Err(AppError::Forbidden);
    }
    clear_cart(&state, user_id).await
}

async fn clear_cart(state: &AppState, user_id: UserId) -> Result<Json<Value>> {
    CartService::new(state.pool()).clear(user_id).await?;

    Ok(Json(json!({ "success": true, "message": "Cart cleared" })))
}

/// `GET /api/cart/summary`
pub async fn summary(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Value>> {
    let summary = CartService::new(state.pool()).summary(user.id).await?;

    Ok(Json(json!({ "success": true, "summary": summary })))
}

/// `GET /api/cart/admin/all` (admin)
pub async fn admin_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Value>> {
    let carts = CartService::new(state.pool()).list_all().await?;

    Ok(Json(json!({
        "success": true,
        "count": carts.len(),
        "carts": carts,
    })))
}
