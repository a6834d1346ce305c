//! Health check handlers.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::error::Result;
use crate::state::AppState;

/// Liveness probe; always succeeds while the process is up.
pub async fn live() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe; fails until the database answers.
pub async fn ready(State(state): State<AppState>) -> Result<Json<Value>> {
    sqlx::query("SELECT 1")
        .execute(state.pool())
        .await
        .map_err(|e| crate::error::AppError::Internal(format!("database not ready: {e}")))?;

    Ok(Json(json!({ "status": "ready" })))
}
