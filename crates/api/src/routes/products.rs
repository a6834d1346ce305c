//! Product catalog handlers.
//!
//! Reads are public; writes require the admin role.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use voltcart_core::ProductId;

use crate::db::ProductRepository;
use crate::db::products::ProductFields;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Body of `POST /api/products` and `PUT /api/products/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub specifications: Option<String>,
    pub image: Option<String>,
    pub available: Option<bool>,
}

impl ProductRequest {
    fn into_fields(self) -> Result<ProductFields> {
        let required = |field: Option<String>, name: &str| -> Result<String> {
            match field {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(AppError::BadRequest(format!("{name} is required"))),
            }
        };

        let price = self
            .price
            .filter(|p| *p >= Decimal::ZERO)
            .ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;

        Ok(ProductFields {
            name: required(self.name, "name")?,
            price,
            category: required(self.category, "category")?,
            brand: required(self.brand, "brand")?,
            specifications: self.specifications,
            image: self.image.unwrap_or_default(),
            available: self.available.unwrap_or(true),
        })
    }
}

/// `GET /api/products`
pub async fn index(State(state): State<AppState>) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool()).list().await?;

    Ok(Json(json!({
        "success": true,
        "count": products.len(),
        "products": products,
    })))
}

/// `GET /api/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(json!({ "success": true, "product": product })))
}

/// `POST /api/products` (admin)
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let fields = body.into_fields()?;
    let product = ProductRepository::new(state.pool()).create(&fields).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "product": product })),
    ))
}

/// `PUT /api/products/{id}` (admin)
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductRequest>,
) -> Result<Json<Value>> {
    let fields = body.into_fields()?;
    let product = ProductRepository::new(state.pool())
        .update(id, &fields)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(json!({ "success": true, "product": product })))
}

/// `DELETE /api/products/{id}` (admin)
pub async fn destroy(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    Ok(Json(json!({ "success": true, "message": "Product deleted" })))
}
