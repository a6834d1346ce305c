//! Authentication middleware and extractors.
//!
//! Bearer tokens are verified statelessly against the server's signing key;
//! the claims carry everything handlers need (id, email, role), so no
//! database round trip happens per request.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use voltcart_core::{Role, UserId};

use crate::error::{AppError, set_sentry_user};
use crate::services::AuthService;
use crate::state::AppState;

/// The authenticated caller, as carried by a verified bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    /// Whether the caller may act on resources owned by `owner`.
    ///
    /// Admins may act on anything; customers only on their own resources.
    #[must_use]
    pub fn can_access(&self, owner: UserId) -> bool {
        self.role.is_admin() || self.id == owner
    }
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        Ok(Self(user))
    }
}

/// Extractor that requires a valid bearer token with the admin role.
///
/// Non-admin callers get a uniform 403 regardless of the resource.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if !user.role.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Verify the Authorization header and build the caller identity.
fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser, AppError> {
    let token = bearer_token(parts)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let auth = AuthService::new(state.pool(), state.jwt(), state.config().token_ttl);
    let claims = auth.verify_token(token)?;

    let user = CurrentUser {
        id: UserId::new(claims.sub),
        email: claims.email,
        role: claims.role,
    };
    set_sentry_user(&user.id, Some(&user.email));

    Ok(user)
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
