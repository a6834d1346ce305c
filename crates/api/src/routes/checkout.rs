//! Checkout route handlers.
//!
//! Order placement and the order listing/status surfaces. Status updates and
//! the phone search are admin-only; the rest is owner-or-admin with a
//! uniform 403 on cross-user access.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use voltcart_core::{OrderId, OrderStatus, PaymentStatus, UserId};

use crate::db::orders::OrderFilter;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{CheckoutRequest, Order, UpdateOrderRequest, UpdateStatusRequest};
use crate::services::OrderService;
use crate::services::order::OrderPage;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;

/// Pagination query parameters (1-based).
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Filter and pagination parameters for the admin listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrdersQuery {
    pub user_id: Option<UserId>,
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn order_json(order: &Order) -> Json<Value> {
    Json(json!({ "success": true, "order": order }))
}

fn page_json(page: &OrderPage) -> Json<Value> {
    let total_pages = if page.total == 0 {
        0
    } else {
        (page.total + page.limit - 1) / page.limit
    };

    Json(json!({
        "success": true,
        "orders": page.orders,
        "pagination": {
            "page": page.page,
            "limit": page.limit,
            "total": page.total,
            "totalPages": total_pages,
        },
    }))
}

/// `POST /api/checkout`
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let order = OrderService::new(state.pool()).checkout(user.id, body).await?;

    Ok((StatusCode::CREATED, order_json(&order)))
}

/// `GET /api/checkout` (caller's orders, paginated)
pub async fn list_own(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let filter = OrderFilter {
        user_id: Some(user.id),
        ..OrderFilter::default()
    };
    let page = OrderService::new(state.pool())
        .list(
            &filter,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;

    Ok(page_json(&page))
}

/// `GET /api/checkout/admin/all` (admin, filterable by user/status)
pub async fn admin_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<AdminOrdersQuery>,
) -> Result<Json<Value>> {
    let filter = OrderFilter {
        user_id: query.user_id,
        order_status: query.order_status,
        payment_status: query.payment_status,
    };
    let page = OrderService::new(state.pool())
        .list(
            &filter,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;

    Ok(page_json(&page))
}

/// `GET /api/checkout/user/{userId}` (owner or admin)
pub async fn list_user(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Value>> {
    if !user.can_access(user_id) {
        return Err(AppError::Forbidden);
    }

    let orders = OrderService::new(state.pool()).list_by_user(user_id).await?;

    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "orders": orders,
    })))
}

/// `GET /api/checkout/search/phone/{phone}` (admin)
pub async fn search_phone(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<Value>> {
    let orders = OrderService::new(state.pool()).find_by_phone(&phone).await?;

    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "orders": orders,
    })))
}

/// `GET /api/checkout/{id}` (owner or admin)
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Value>> {
    let order = OrderService::new(state.pool()).get(id).await?;
    if !user.can_access(order.user_id) {
        return Err(AppError::Forbidden);
    }

    Ok(order_json(&order))
}

/// `PATCH /api/checkout/{id}/status` (admin)
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Value>> {
    let order = OrderService::new(state.pool()).update_status(id, &body).await?;

    Ok(order_json(&order))
}

/// `PUT /api/checkout/{id}` (owner or admin)
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<Json<Value>> {
    let service = OrderService::new(state.pool());
    let order = service.get(id).await?;
    if !user.can_access(order.user_id) {
        return Err(AppError::Forbidden);
    }

    let order = service.update_details(id, &body).await?;

    Ok(order_json(&order))
}

/// `DELETE /api/checkout/{id}` (owner or admin)
pub async fn destroy(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Value>> {
    let service = OrderService::new(state.pool());
    let order = service.get(id).await?;
    if !user.can_access(order.user_id) {
        return Err(AppError::Forbidden);
    }

    service.delete(id).await?;

    Ok(Json(json!({ "success": true, "message": "Order deleted" })))
}
