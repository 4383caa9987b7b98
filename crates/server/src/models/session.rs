//! Session-stored types and the session key registry.

use serde::{Deserialize, Serialize};

use fithero_core::{Email, UserId};

/// Keys under which values are stored in the tower-sessions session.
pub mod session_keys {
    /// The authenticated user ([`super::CurrentUser`]).
    pub const CURRENT_USER: &str = "current_user";
    /// CSRF state for the in-flight Google OAuth handshake.
    pub const OAUTH_STATE: &str = "oauth_state";
}

/// The authenticated user, as stored in the session cookie's server-side
/// record after a successful Google sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The resolved user ID every engine operation keys off.
    pub user_id: UserId,
    /// Email, kept for logging and the `/api/me` fast path.
    pub email: Email,
    /// Username at sign-in time.
    pub username: String,
}
