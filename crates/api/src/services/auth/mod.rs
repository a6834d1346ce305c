//! Authentication service.
//!
//! Provides password registration/login, stateless bearer tokens, and Google
//! OAuth login with account linking by email. Login failures are reported as
//! one generic invalid-credentials error so callers cannot distinguish an
//! unknown email from a wrong password.

mod error;
pub mod google;

pub use error::AuthError;
pub use google::{GoogleOAuthClient, GoogleProfile};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use voltcart_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::state::JwtKeys;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Lifetime of the OAuth CSRF state token.
const OAUTH_STATE_TTL_SECS: i64 = 600;

/// Claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: i32,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by the short-lived OAuth state token.
///
/// With no server-side sessions, CSRF protection for the OAuth round trip
/// comes from signing the state parameter itself.
#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    purpose: String,
    nonce: String,
    iat: i64,
    exp: i64,
}

const OAUTH_STATE_PURPOSE: &str = "google_oauth";

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    jwt: &'a JwtKeys,
    token_ttl: std::time::Duration,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, jwt: &'a JwtKeys, token_ttl: std::time::Duration) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
            token_ttl,
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new user with name, email, and password.
    ///
    /// Returns the created user and a freshly issued bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` or `AuthError::InvalidEmail` for bad
    /// payloads, `AuthError::WeakPassword` if the password doesn't meet
    /// requirements, and `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        if name.trim().is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(name.trim(), &email, &password_hash, Role::Customer)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Sign a bearer token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if signing fails.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        #[allow(clippy::cast_possible_wrap)] // Configured TTLs are far below i64::MAX seconds
        let claims = Claims {
            sub: user.id.as_i32(),
            email: user.email.as_str().to_owned(),
            role: user.role,
            iat: now,
            exp: now + self.token_ttl.as_secs() as i64,
        };

        sign(self.jwt, &claims)
    }

    /// Verify a bearer token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed, expired,
    /// or carries a bad signature.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        verify(self.jwt, token)
    }

    /// Exchange a valid token for a fresh one.
    ///
    /// Re-reads the account so a role change or deletion takes effect at
    /// refresh time rather than only at expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a bad token and
    /// `AuthError::UserNotFound` if the account no longer exists.
    pub async fn refresh_token(&self, token: &str) -> Result<(User, String), AuthError> {
        let claims = self.verify_token(token)?;
        let user = self
            .users
            .get_by_id(UserId::new(claims.sub))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Resolve the account behind a valid token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a bad token and
    /// `AuthError::UserNotFound` if the account no longer exists.
    pub async fn verify_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.verify_token(token)?;
        self.users
            .get_by_id(UserId::new(claims.sub))
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    // =========================================================================
    // Google OAuth
    // =========================================================================

    /// Sign a short-lived state token for the OAuth round trip.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if signing fails.
    pub fn issue_oauth_state(&self) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = StateClaims {
            purpose: OAUTH_STATE_PURPOSE.to_string(),
            nonce: format!("{:016x}", rand::rng().random::<u64>()),
            iat: now,
            exp: now + OAUTH_STATE_TTL_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, self.jwt.encoding())
            .map_err(AuthError::TokenSigning)
    }

    /// Check the state parameter returned by the OAuth callback.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOauthState` if the state is missing its
    /// purpose, expired, or not signed by this server.
    pub fn verify_oauth_state(&self, state: &str) -> Result<(), AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<StateClaims>(state, self.jwt.decoding(), &validation)
            .map_err(|_| AuthError::InvalidOauthState)?;

        if data.claims.purpose == OAUTH_STATE_PURPOSE {
            Ok(())
        } else {
            Err(AuthError::InvalidOauthState)
        }
    }

    /// Login (or register) via a verified Google profile.
    ///
    /// Resolution order: an account already linked to this Google ID wins;
    /// otherwise an account with the same email is linked; otherwise a new
    /// customer account is created without a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Google` if the profile has no email and
    /// `AuthError::Repository` on database failures.
    pub async fn login_with_google(
        &self,
        profile: &GoogleProfile,
    ) -> Result<(User, String), AuthError> {
        let user = match self.users.get_by_google_id(&profile.id).await? {
            Some(user) => user,
            None => self.link_or_create_google_user(profile).await?,
        };

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    async fn link_or_create_google_user(
        &self,
        profile: &GoogleProfile,
    ) -> Result<User, AuthError> {
        let email = Email::parse(profile.email()?)?;

        if let Some(mut user) = self.users.get_by_email(&email).await? {
            // Link-by-email: same address means same account
            self.users.link_google_id(user.id, &profile.id).await?;
            user.google_id = Some(profile.id.clone());
            return Ok(user);
        }

        let name = profile
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.local_part());

        Ok(self
            .users
            .create_with_google(name, &email, &profile.id)
            .await?)
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    /// Ensure the configured admin account exists.
    ///
    /// Returns the created user, or `None` if the email is already
    /// registered (the existing account is left untouched).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::WeakPassword` for a
    /// bad bootstrap configuration.
    pub async fn seed_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let email = Email::parse(email)?;
        if self.users.get_by_email(&email).await?.is_some() {
            return Ok(None);
        }

        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password("Administrator", &email, &password_hash, Role::Admin)
            .await?;

        Ok(Some(user))
    }
}

// =============================================================================
// Token helpers
// =============================================================================

fn sign(keys: &JwtKeys, claims: &Claims) -> Result<String, AuthError> {
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, keys.encoding())
        .map_err(AuthError::TokenSigning)
}

fn verify(keys: &JwtKeys, token: &str) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    jsonwebtoken::decode::<Claims>(token, keys.decoding(), &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

// =============================================================================
// Password helpers
// =============================================================================

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::from_secret(b"kJ8x2Qw9mZ4pL7vN3rT6yB1cD5fG0hSu")
    }

    fn claims(exp_offset: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: 42,
            email: "user@example.com".to_string(),
            role: Role::Customer,
            iat: now,
            exp: now + exp_offset,
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let keys = keys();
        let token = sign(&keys, &claims(3600)).unwrap();
        let decoded = verify(&keys, &token).unwrap();

        assert_eq!(decoded.sub, 42);
        assert_eq!(decoded.email, "user@example.com");
        assert_eq!(decoded.role, Role::Customer);
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys();
        // Two hours past expiry, well beyond the default leeway
        let token = sign(&keys, &claims(-7200)).unwrap();

        assert!(matches!(
            verify(&keys, &token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_from_other_key_rejected() {
        let token = sign(&keys(), &claims(3600)).unwrap();
        let other = JwtKeys::from_secret(b"uShG0f5Dc1By6Tr3Nv7Lp4Zm9wQ2x8Jk");

        assert!(matches!(
            verify(&other, &token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            verify(&keys(), "not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same password").unwrap();
        let second = hash_password("same password").unwrap();
        assert_ne!(first, second);
    }
}
