//! User service: account lifecycle and the leaderboard.
//!
//! Profile updates that touch points or level re-derive the dependent fields
//! through the progression tables so the stored state stays consistent no
//! matter which field the caller changed.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use fithero_core::{Email, EmailError, Points, PointsError, UserId, progression};

use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// Default number of leaderboard entries.
const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Maximum number of leaderboard entries.
const MAX_LEADERBOARD_LIMIT: i64 = 100;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// User is absent or deactivated.
    #[error("user not found")]
    NotFound,

    /// A unique field (email, username) is already taken.
    #[error("{0}")]
    Duplicate(String),

    /// Submitted email failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Submitted point value failed validation.
    #[error("invalid points: {0}")]
    InvalidPoints(#[from] PointsError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    /// New username (uniqueness-checked).
    pub username: Option<String>,
    /// New email (validated and uniqueness-checked).
    pub email: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New level; also re-derives the character.
    pub level: Option<i32>,
    /// New point balance; also re-derives level and character.
    pub points: Option<i32>,
    /// Explicit character override.
    pub character: Option<String>,
    /// Explicit job title override.
    pub job_title: Option<String>,
}

/// Service for user accounts.
pub struct UserService<'a> {
    users: UserRepository<'a>,
}

impl<'a> UserService<'a> {
    /// Create a new user service over the given pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Get an active user by ID.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the user is absent or deactivated.
    pub async fn get_user(&self, id: UserId) -> Result<User, UserError> {
        let user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        if !user.is_active {
            return Err(UserError::NotFound);
        }

        Ok(user)
    }

    /// Apply a partial profile update.
    ///
    /// Username and email changes are checked against existing accounts
    /// first; the unique constraints remain the backstop for races. A new
    /// `points` value re-derives level and character; a new `level` value
    /// re-derives the character; explicit `character`/`job_title` overrides
    /// win over the derived values.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the user is absent or deactivated.
    /// Returns `UserError::Duplicate` if the username or email is taken.
    /// Returns `UserError::InvalidEmail` / `UserError::InvalidPoints` on
    /// bad input.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: UpdateProfile,
    ) -> Result<User, UserError> {
        let mut user = self.get_user(id).await?;

        if let Some(username) = update.username
            && username != user.username
        {
            if self.users.get_by_username(&username).await?.is_some() {
                return Err(UserError::Duplicate("username already exists".to_owned()));
            }
            user.username = username;
        }

        if let Some(email) = update.email {
            let email = Email::parse(&email)?;
            if email != user.email {
                if self.users.get_by_email(&email).await?.is_some() {
                    return Err(UserError::Duplicate("email already exists".to_owned()));
                }
                user.email = email;
            }
        }

        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }

        if let Some(level) = update.level {
            user.level = level;
            user.character = progression::character_for_level(level).to_owned();
        }

        if let Some(points) = update.points {
            let points = Points::new(points)?;
            user.points = points;
            user.level = progression::level_for_points(points);
            user.character = progression::character_for_level(user.level).to_owned();
        }

        if let Some(character) = update.character {
            user.character = character;
        }
        if let Some(job_title) = update.job_title {
            user.job_title = job_title;
        }

        let updated = self.users.update_account(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(msg) => UserError::Duplicate(msg),
            RepositoryError::NotFound => UserError::NotFound,
            other => UserError::Repository(other),
        })?;

        Ok(updated)
    }

    /// Soft-delete a user (deactivate; the row and its history stay).
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the user is absent or already
    /// deactivated.
    pub async fn delete_user(&self, id: UserId) -> Result<(), UserError> {
        self.get_user(id).await?;

        if !self.users.deactivate(id).await? {
            return Err(UserError::NotFound);
        }

        Ok(())
    }

    /// Top active users by points, descending.
    ///
    /// `limit` defaults to 10 and is clamped to at most 100.
    ///
    /// # Errors
    ///
    /// Returns `UserError::Repository` if the query fails.
    pub async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<User>, UserError> {
        Ok(self.users.leaderboard(clamp_limit(limit)).await?)
    }
}

/// Clamp a requested leaderboard size to the allowed range.
const fn clamp_limit(limit: Option<i64>) -> i64 {
    match limit {
        None => DEFAULT_LEADERBOARD_LIMIT,
        Some(n) if n <= 0 => DEFAULT_LEADERBOARD_LIMIT,
        Some(n) if n > MAX_LEADERBOARD_LIMIT => MAX_LEADERBOARD_LIMIT,
        Some(n) => n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit_default() {
        assert_eq!(clamp_limit(None), 10);
    }

    #[test]
    fn test_clamp_limit_non_positive() {
        assert_eq!(clamp_limit(Some(0)), 10);
        assert_eq!(clamp_limit(Some(-5)), 10);
    }

    #[test]
    fn test_clamp_limit_max() {
        assert_eq!(clamp_limit(Some(100)), 100);
        assert_eq!(clamp_limit(Some(101)), 100);
        assert_eq!(clamp_limit(Some(10_000)), 100);
    }

    #[test]
    fn test_clamp_limit_in_range() {
        assert_eq!(clamp_limit(Some(1)), 1);
        assert_eq!(clamp_limit(Some(25)), 25);
    }
}
