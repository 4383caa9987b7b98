//! User domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fithero_core::{Email, Points, UserId};

/// A FitHero user (domain type).
///
/// Holds both the account identity and the point-economy state. The
/// `points`, `level`, and `character` fields move together: every balance
/// mutation goes through the ledger, which recomputes level and character
/// from the new balance and writes all three in one update.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Google account ID, if the account was created or linked via OAuth.
    pub google_id: Option<String>,
    /// User's email address.
    pub email: Email,
    /// Unique display username.
    pub username: String,
    /// Given name from the OAuth profile.
    pub first_name: String,
    /// Family name from the OAuth profile.
    pub last_name: String,
    /// Avatar URL from the OAuth profile.
    pub picture: String,
    /// Current level (1-5), derived from `points`.
    pub level: i32,
    /// Current point balance.
    pub points: Points,
    /// Display character, derived from `level` unless overridden by a
    /// character-grant achievement.
    pub character: String,
    /// Job title, granted by job-title achievements.
    pub job_title: String,
    /// Whether the account is active. Deleted accounts are deactivated, not
    /// removed, so ledger history stays referenceable.
    pub is_active: bool,
    /// When the user last signed in.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
