//! Authentication route handlers.
//!
//! Password signup/login, token verification and refresh, and the Google
//! OAuth round trip. OAuth logins end in a redirect to the frontend with the
//! bearer token in the query string.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::Redirect,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::services::AuthService;
use crate::services::auth::GoogleOAuthClient;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Body of `POST /user/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Query parameters of the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /user/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let name = body.name.as_deref().unwrap_or_default();
    let email = body
        .email
        .as_deref()
        .ok_or(AppError::BadRequest("email is required".to_string()))?;
    let password = body
        .password
        .as_deref()
        .ok_or(AppError::BadRequest("password is required".to_string()))?;

    let auth = auth_service(&state);
    let (user, token) = auth.register(name, email, password).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "token": token,
            "user": UserProfile::from(&user),
        })),
    ))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let email = body
        .email
        .as_deref()
        .ok_or(AppError::BadRequest("email is required".to_string()))?;
    let password = body
        .password
        .as_deref()
        .ok_or(AppError::BadRequest("password is required".to_string()))?;

    let auth = auth_service(&state);
    let (user, token) = auth.login(email, password).await?;

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": UserProfile::from(&user),
    })))
}

/// `POST /auth/refresh-token`
///
/// Takes the current token from the Authorization header and returns a fresh
/// one, re-reading the account so role changes apply immediately.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let token = bearer_token(&headers)?;

    let auth = auth_service(&state);
    let (user, token) = auth.refresh_token(token).await?;

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": UserProfile::from(&user),
    })))
}

/// `GET /auth/verify`
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    let token = bearer_token(&headers)?;

    let auth = auth_service(&state);
    let user = auth.verify_user(token).await?;

    Ok(Json(json!({
        "success": true,
        "user": UserProfile::from(&user),
    })))
}

/// `GET /auth/google`
pub async fn google_login(State(state): State<AppState>) -> Result<Redirect> {
    let google_config = state
        .config()
        .google
        .as_ref()
        .ok_or(AppError::Auth(
            crate::services::auth::AuthError::OauthNotConfigured,
        ))?;

    let auth = auth_service(&state);
    let oauth_state = auth.issue_oauth_state()?;

    let client = GoogleOAuthClient::new(state.http(), google_config, &state.config().base_url);
    let url = client
        .authorization_url(&oauth_state)
        .map_err(crate::services::auth::AuthError::Google)?;

    Ok(Redirect::to(url.as_str()))
}

/// `GET /auth/google/callback`
///
/// Redirects to the frontend with `?token=<bearer token>` on success and
/// `?error=<reason>` when Google reported an error or the exchange failed.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<Redirect> {
    let frontend = state.config().frontend_url.trim_end_matches('/');

    if query.error.is_some() {
        return Ok(Redirect::to(&format!(
            "{frontend}/auth/callback?error=access_denied"
        )));
    }

    let google_config = state
        .config()
        .google
        .as_ref()
        .ok_or(AppError::Auth(
            crate::services::auth::AuthError::OauthNotConfigured,
        ))?;

    let auth = auth_service(&state);
    auth.verify_oauth_state(query.state.as_deref().unwrap_or_default())?;

    let code = query
        .code
        .as_deref()
        .ok_or(AppError::BadRequest("missing authorization code".to_string()))?;

    let client = GoogleOAuthClient::new(state.http(), google_config, &state.config().base_url);
    let profile = client
        .fetch_profile(code)
        .await
        .map_err(crate::services::auth::AuthError::Google)?;

    let (_, token) = auth.login_with_google(&profile).await?;

    Ok(Redirect::to(&format!(
        "{frontend}/auth/callback?token={token}"
    )))
}

// =============================================================================
// Helpers
// =============================================================================

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(state.pool(), state.jwt(), state.config().token_ttl)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))
}
