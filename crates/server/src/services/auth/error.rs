//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during the Google sign-in flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// OAuth callback arrived without an authorization code.
    #[error("authorization code missing from callback")]
    MissingCode,

    /// CSRF state was missing or did not match the session's.
    #[error("oauth state mismatch")]
    InvalidState,

    /// The provider reported the user denied (or the handshake failed).
    #[error("authorization denied: {0}")]
    Denied(String),

    /// The code-for-token exchange failed at the provider.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The userinfo fetch failed at the provider.
    #[error("userinfo fetch failed: {0}")]
    Userinfo(String),

    /// Transport-level HTTP failure talking to the provider.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned an invalid email.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] fithero_core::EmailError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
