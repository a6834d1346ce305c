//! Google OAuth 2.0 client (authorization-code flow).
//!
//! Builds the consent-screen URL, exchanges the callback code for tokens,
//! and fetches the user's profile. Only the profile fields the account
//! workflow needs are deserialized.

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::GoogleOAuthConfig;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Errors from the Google OAuth exchange.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// Network or HTTP-level failure (including non-2xx responses).
    #[error("google request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The callback URL could not be constructed.
    #[error("invalid oauth url: {0}")]
    Url(#[from] url::ParseError),

    /// Google returned a profile without an email address.
    #[error("google profile has no email")]
    MissingEmail,
}

/// Token response from the code exchange.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// The subset of the Google userinfo payload the account workflow uses.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Stable Google account identifier.
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl GoogleProfile {
    /// The profile email, required for account lookup and linking.
    ///
    /// # Errors
    ///
    /// Returns `GoogleError::MissingEmail` if Google returned no email.
    pub fn email(&self) -> Result<&str, GoogleError> {
        self.email.as_deref().ok_or(GoogleError::MissingEmail)
    }
}

/// Google OAuth client bound to one set of credentials.
pub struct GoogleOAuthClient<'a> {
    http: &'a reqwest::Client,
    config: &'a GoogleOAuthConfig,
    redirect_uri: String,
}

impl<'a> GoogleOAuthClient<'a> {
    /// Create a client; `base_url` is this API's public origin.
    #[must_use]
    pub fn new(http: &'a reqwest::Client, config: &'a GoogleOAuthConfig, base_url: &str) -> Self {
        Self {
            http,
            config,
            redirect_uri: format!("{}/auth/google/callback", base_url.trim_end_matches('/')),
        }
    }

    /// Build the consent-screen URL the client is redirected to.
    ///
    /// # Errors
    ///
    /// Returns `GoogleError::Url` if the endpoint constant fails to parse
    /// (cannot happen in practice).
    pub fn authorization_url(&self, state: &str) -> Result<Url, GoogleError> {
        let mut url = Url::parse(AUTH_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("state", state);
        Ok(url)
    }

    /// Exchange the callback authorization code and fetch the user profile.
    ///
    /// # Errors
    ///
    /// Returns `GoogleError::Http` if either round trip fails or Google
    /// responds with an error status.
    pub async fn fetch_profile(&self, code: &str) -> Result<GoogleProfile, GoogleError> {
        let token: TokenResponse = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("code", code),
                ("client_id", &self.config.client_id),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("redirect_uri", &self.redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let profile: GoogleProfile = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(profile)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-123.apps.googleusercontent.com".to_string(),
            client_secret: SecretString::from("not-used-in-this-test"),
        }
    }

    #[test]
    fn test_authorization_url_carries_state_and_redirect() {
        let http = reqwest::Client::new();
        let cfg = config();
        let client = GoogleOAuthClient::new(&http, &cfg, "https://api.voltcart.test/");

        let url = client.authorization_url("state-token").unwrap();
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(query.contains(&("state".to_string(), "state-token".to_string())));
        assert!(query.contains(&(
            "redirect_uri".to_string(),
            "https://api.voltcart.test/auth/google/callback".to_string()
        )));
        assert!(query.contains(&("response_type".to_string(), "code".to_string())));
    }

    #[test]
    fn test_profile_without_email_is_rejected() {
        let profile = GoogleProfile {
            id: "g-1".to_string(),
            email: None,
            name: None,
        };
        assert!(matches!(profile.email(), Err(GoogleError::MissingEmail)));
    }
}
