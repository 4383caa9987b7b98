//! User repository for database operations.
//!
//! Owns every read and write against the `users` table. Balance mutations go
//! through [`UserRepository::update_progress`], which writes points, level,
//! and character as a single UPDATE - the ledger's one-write contract.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use fithero_core::{Email, Points, UserId};

use super::RepositoryError;
use crate::models::User;

/// Fields for creating a new user.
#[derive(Debug)]
pub struct NewUser<'a> {
    /// Google account ID, when created via OAuth.
    pub google_id: Option<&'a str>,
    /// Unique email address.
    pub email: &'a Email,
    /// Unique username.
    pub username: &'a str,
    /// Given name (may be empty).
    pub first_name: &'a str,
    /// Family name (may be empty).
    pub last_name: &'a str,
    /// Avatar URL (may be empty).
    pub picture: &'a str,
}

/// Database row for a user, validated into [`User`] on read.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    google_id: Option<String>,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    picture: String,
    level: i32,
    points: i32,
    character_name: String,
    job_title: String,
    is_active: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let points = Points::new(self.points).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid points in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            google_id: self.google_id,
            email,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            picture: self.picture,
            level: self.level,
            points,
            character: self.character_name,
            job_title: self.job_title,
            is_active: self.is_active,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, google_id, email, username, first_name, last_name, picture, \
     level, points, character_name, job_title, is_active, last_login_at, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user by their Google account ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_id = $1"
        ))
        .bind(google_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user by their username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Create a new user with the default level-1 progression state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email, username, or Google
    /// ID already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser<'_>) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (google_id, email, username, first_name, last_name, picture) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.google_id)
        .bind(new_user.email.as_str())
        .bind(new_user.username)
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(new_user.picture)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "email or username already exists"))?;

        row.into_domain()
    }

    /// Persist a user's account fields (profile, identity, progression).
    ///
    /// Writes the full mutable field set from the domain object; `id`,
    /// `created_at`, and `is_active` are untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a unique field collides.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_account(&self, user: &User) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users \
             SET email = $2, username = $3, first_name = $4, last_name = $5, picture = $6, \
                 level = $7, points = $8, character_name = $9, job_title = $10, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id.as_i32())
        .bind(user.email.as_str())
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.picture)
        .bind(user.level)
        .bind(user.points.as_i32())
        .bind(&user.character)
        .bind(&user.job_title)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "email or username already exists"))?;

        row.ok_or(RepositoryError::NotFound)?.into_domain()
    }

    /// Persist a new balance together with its derived level and character.
    ///
    /// This is the ledger's single write: the three fields always move
    /// together so a stored balance can never disagree with the stored level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_progress(
        &self,
        id: UserId,
        points: Points,
        level: i32,
        character: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users \
             SET points = $2, level = $3, character_name = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(points.as_i32())
        .bind(level)
        .bind(character)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Set the user's display character (character-grant achievements).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_character(&self, id: UserId, character: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET character_name = $2, updated_at = NOW() WHERE id = $1")
                .bind(id.as_i32())
                .bind(character)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Set the user's job title (job-title-grant achievements).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_job_title(&self, id: UserId, job_title: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET job_title = $2, updated_at = NOW() WHERE id = $1")
                .bind(id.as_i32())
                .bind(job_title)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Link a Google account to an existing user and refresh the profile
    /// fields Google is authoritative for.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the Google ID is already linked
    /// to another account.
    pub async fn link_google(
        &self,
        id: UserId,
        google_id: &str,
        first_name: &str,
        last_name: &str,
        picture: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users \
             SET google_id = $2, first_name = $3, last_name = $4, picture = $5, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(google_id)
        .bind(first_name)
        .bind(last_name)
        .bind(picture)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "google account already linked"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Stamp the user's last-login time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn touch_last_login(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Deactivate (soft-delete) a user.
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deactivated, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn deactivate(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id.as_i32())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Top active users ordered by points descending.
    ///
    /// Ties break on the lower user ID for a stable ordering.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn leaderboard(&self, limit: i64) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE is_active \
             ORDER BY points DESC, id ASC \
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_domain).collect()
    }
}
