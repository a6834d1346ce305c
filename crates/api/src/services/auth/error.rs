//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

use super::google::GoogleError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] voltcart_core::EmailError),

    /// A required registration field is missing.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Bearer token missing, malformed, expired, or badly signed.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Token could not be signed.
    #[error("token signing error: {0}")]
    TokenSigning(jsonwebtoken::errors::Error),

    /// Google login attempted without OAuth credentials configured.
    #[error("google login is not configured")]
    OauthNotConfigured,

    /// OAuth state parameter missing, expired, or forged.
    #[error("invalid oauth state")]
    InvalidOauthState,

    /// Google OAuth exchange failed.
    #[error("google oauth error: {0}")]
    Google(#[from] GoogleError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
