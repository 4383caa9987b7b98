//! Google OAuth sign-in.
//!
//! The engine itself never sees tokens - sign-in resolves a Google profile
//! to a local [`User`] and the routes put its ID in the session. Account
//! resolution order: existing Google link, then email match (the Google
//! account gets linked), then a fresh account with the default level-1
//! progression state.

mod error;

pub use error::AuthError;

use rand::Rng;
use serde::Deserialize;
use sqlx::PgPool;

use fithero_core::Email;

use secrecy::ExposeSecret;

use crate::config::GoogleOAuthConfig;
use crate::db::users::NewUser;
use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// Google OAuth authorization endpoint.
const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google OAuth token endpoint.
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Google userinfo endpoint.
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Scopes requested at sign-in.
const OAUTH_SCOPES: &str = "openid email profile";

/// Profile returned by Google's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    /// Stable Google account ID.
    pub id: String,
    /// Verified email address.
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub given_name: String,
    /// Family name.
    #[serde(default)]
    pub family_name: String,
    /// Avatar URL.
    #[serde(default)]
    pub picture: String,
}

/// Token endpoint response; only the access token is used.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google sign-in service.
pub struct GoogleAuthService<'a> {
    users: UserRepository<'a>,
    google: &'a GoogleOAuthConfig,
    http: &'a reqwest::Client,
}

impl<'a> GoogleAuthService<'a> {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        google: &'a GoogleOAuthConfig,
        http: &'a reqwest::Client,
    ) -> Self {
        Self {
            users: UserRepository::new(pool),
            google,
            http,
        }
    }

    /// Build the Google authorization URL for a login redirect.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.google.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", OAUTH_SCOPES)
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .finish();

        format!("{AUTH_ENDPOINT}?{query}")
    }

    /// Complete sign-in from an OAuth callback code.
    ///
    /// Exchanges the code, fetches the Google profile, and resolves it to a
    /// local user. The last-login stamp is best effort - its failure is
    /// logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExchange` / `AuthError::Userinfo` if Google
    /// rejects the handshake, `AuthError::InvalidEmail` if the profile email
    /// is malformed, or `AuthError::Repository` on storage failures.
    pub async fn sign_in_with_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<User, AuthError> {
        let access_token = self.exchange_code(code, redirect_uri).await?;
        let info = self.fetch_userinfo(&access_token).await?;
        let user = self.find_or_create(&info).await?;

        if let Err(e) = self.users.touch_last_login(user.id).await {
            tracing::warn!(user_id = %user.id, error = %e, "failed to stamp last login");
        }

        Ok(user)
    }

    /// Resolve an email to a local user without Google, creating the account
    /// if needed. Only reachable when dev login is enabled in config.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` on a malformed email or
    /// `AuthError::Repository` on storage failures.
    pub async fn dev_sign_in(&self, email: &str, username: Option<&str>) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        if let Some(user) = self.users.get_by_email(&email).await? {
            return Ok(user);
        }

        let username = match username {
            Some(name) => name.to_owned(),
            None => self.unique_username(email.local_part()).await?,
        };

        let user = self
            .users
            .create(&NewUser {
                google_id: None,
                email: &email,
                username: &username,
                first_name: "",
                last_name: "",
                picture: "",
            })
            .await?;

        Ok(user)
    }

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, AuthError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("code", code),
                ("client_id", &self.google.client_id),
                ("client_secret", self.google.client_secret.expose_secret()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::TokenExchange(format!(
                "status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Fetch the signed-in user's Google profile.
    async fn fetch_userinfo(&self, access_token: &str) -> Result<GoogleUserInfo, AuthError> {
        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Userinfo(format!("status {}", response.status())));
        }

        Ok(response.json().await?)
    }

    /// Resolve a Google profile to a local user.
    async fn find_or_create(&self, info: &GoogleUserInfo) -> Result<User, AuthError> {
        let email = Email::parse(&info.email)?;

        // Existing Google link wins
        if let Some(user) = self.users.get_by_google_id(&info.id).await? {
            self.refresh_profile(&user, info).await;
            return Ok(user);
        }

        // Same email: link the Google account to the existing user
        if let Some(user) = self.users.get_by_email(&email).await? {
            self.refresh_profile(&user, info).await;
            return Ok(user);
        }

        // Fresh account with the default level-1 progression state
        let username = self.unique_username(email.local_part()).await?;
        let user = self
            .users
            .create(&NewUser {
                google_id: Some(&info.id),
                email: &email,
                username: &username,
                first_name: &info.given_name,
                last_name: &info.family_name,
                picture: &info.picture,
            })
            .await
            .map_err(|e| match e {
                // A concurrent sign-in created the account between our
                // lookups and the insert; treat the conflict as a retryable
                // handshake failure rather than corrupting state.
                RepositoryError::Conflict(msg) => AuthError::Denied(msg),
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Best-effort refresh of the linked Google profile fields.
    async fn refresh_profile(&self, user: &User, info: &GoogleUserInfo) {
        if let Err(e) = self
            .users
            .link_google(
                user.id,
                &info.id,
                &info.given_name,
                &info.family_name,
                &info.picture,
            )
            .await
        {
            tracing::warn!(user_id = %user.id, error = %e, "failed to refresh Google profile");
        }
    }

    /// Derive a free username from an email local part, suffixing randomly
    /// if the plain form is taken.
    async fn unique_username(&self, base: &str) -> Result<String, AuthError> {
        let base = if base.is_empty() { "user" } else { base };

        if self.users.get_by_username(base).await?.is_none() {
            return Ok(base.to_owned());
        }

        Ok(format!("{base}-{}", random_suffix(6)))
    }
}

/// Generate a short random lowercase-alphanumeric suffix.
fn random_suffix(length: usize) -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_suffix_shape() {
        let suffix = random_suffix(6);
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_userinfo_deserializes_with_missing_optionals() {
        let info: GoogleUserInfo =
            serde_json::from_str(r#"{"id": "g-123", "email": "hero@example.com"}"#)
                .expect("minimal userinfo should parse");
        assert_eq!(info.id, "g-123");
        assert_eq!(info.given_name, "");
        assert_eq!(info.picture, "");
    }
}
