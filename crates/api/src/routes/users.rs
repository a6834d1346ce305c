//! User administration handlers.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::UserProfile;
use crate::state::AppState;

/// `GET /api/users` (admin)
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Value>> {
    let users = UserRepository::new(state.pool()).list().await?;
    let profiles: Vec<UserProfile> = users.iter().map(UserProfile::from).collect();

    Ok(Json(json!({
        "success": true,
        "count": profiles.len(),
        "users": profiles,
    })))
}
