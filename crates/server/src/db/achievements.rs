//! Achievement repository: catalog reads and unlock records.
//!
//! The `(user_id, achievement_id)` unique constraint on `user_achievements`
//! backstops the engine's already-unlocked check: a conflicting insert maps
//! to [`RepositoryError::Conflict`], which the unlock handler treats as
//! "already unlocked" rather than a fatal fault.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use fithero_core::{AchievementId, AchievementKind, Points, UnlockId, UserId};

use super::RepositoryError;
use crate::models::{Achievement, AchievementUnlock, UnlockedAchievement};

/// Database row for a catalog achievement, validated into [`Achievement`].
#[derive(sqlx::FromRow)]
struct AchievementRow {
    id: i32,
    title: String,
    description: String,
    icon: String,
    cost: i32,
    kind: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AchievementRow {
    fn into_domain(self) -> Result<Achievement, RepositoryError> {
        let cost = Points::new(self.cost).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid achievement cost in database: {e}"))
        })?;
        let kind = self.kind.parse::<AchievementKind>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid value in database: {e}"))
        })?;

        Ok(Achievement {
            id: AchievementId::new(self.id),
            title: self.title,
            description: self.description,
            icon: self.icon,
            cost,
            kind,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for an unlock record.
#[derive(sqlx::FromRow)]
struct UnlockRow {
    id: i32,
    user_id: i32,
    achievement_id: i32,
    unlocked_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl UnlockRow {
    fn into_domain(self) -> AchievementUnlock {
        AchievementUnlock {
            id: UnlockId::new(self.id),
            user_id: UserId::new(self.user_id),
            achievement_id: AchievementId::new(self.achievement_id),
            unlocked_at: self.unlocked_at,
            created_at: self.created_at,
        }
    }
}

/// Flattened row for the unlock + achievement join.
#[derive(sqlx::FromRow)]
struct UnlockJoinRow {
    unlock_id: i32,
    user_id: i32,
    achievement_id: i32,
    unlocked_at: DateTime<Utc>,
    unlock_created_at: DateTime<Utc>,
    title: String,
    description: String,
    icon: String,
    cost: i32,
    kind: String,
    achievement_created_at: DateTime<Utc>,
    achievement_updated_at: DateTime<Utc>,
}

impl UnlockJoinRow {
    fn into_domain(self) -> Result<UnlockedAchievement, RepositoryError> {
        let achievement = AchievementRow {
            id: self.achievement_id,
            title: self.title,
            description: self.description,
            icon: self.icon,
            cost: self.cost,
            kind: self.kind,
            created_at: self.achievement_created_at,
            updated_at: self.achievement_updated_at,
        }
        .into_domain()?;

        Ok(UnlockedAchievement {
            unlock: AchievementUnlock {
                id: UnlockId::new(self.unlock_id),
                user_id: UserId::new(self.user_id),
                achievement_id: AchievementId::new(self.achievement_id),
                unlocked_at: self.unlocked_at,
                created_at: self.unlock_created_at,
            },
            achievement,
        })
    }
}

const ACHIEVEMENT_COLUMNS: &str =
    "id, title, description, icon, cost, kind, created_at, updated_at";

const UNLOCK_JOIN_COLUMNS: &str = "ua.id AS unlock_id, ua.user_id, ua.achievement_id, \
     ua.unlocked_at, ua.created_at AS unlock_created_at, \
     a.title, a.description, a.icon, a.cost, a.kind, \
     a.created_at AS achievement_created_at, a.updated_at AS achievement_updated_at";

/// Repository for the achievement catalog and unlock records.
pub struct AchievementRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AchievementRepository<'a> {
    /// Create a new achievement repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get all catalog achievements.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn get_all(&self) -> Result<Vec<Achievement>, RepositoryError> {
        let rows = sqlx::query_as::<_, AchievementRow>(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AchievementRow::into_domain).collect()
    }

    /// Get a catalog achievement by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(
        &self,
        id: AchievementId,
    ) -> Result<Option<Achievement>, RepositoryError> {
        let row = sqlx::query_as::<_, AchievementRow>(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(AchievementRow::into_domain).transpose()
    }

    // =========================================================================
    // Unlocks
    // =========================================================================

    /// Check whether a user has already unlocked an achievement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_unlocked(
        &self,
        user_id: UserId,
        achievement_id: AchievementId,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                 SELECT 1 FROM user_achievements \
                 WHERE user_id = $1 AND achievement_id = $2 \
             )",
        )
        .bind(user_id.as_i32())
        .bind(achievement_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create an unlock record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already unlocked this
    /// achievement (the unique constraint caught a concurrent unlock).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_unlock(
        &self,
        user_id: UserId,
        achievement_id: AchievementId,
    ) -> Result<AchievementUnlock, RepositoryError> {
        let row = sqlx::query_as::<_, UnlockRow>(
            "INSERT INTO user_achievements (user_id, achievement_id) \
             VALUES ($1, $2) \
             RETURNING id, user_id, achievement_id, unlocked_at, created_at",
        )
        .bind(user_id.as_i32())
        .bind(achievement_id.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "achievement already unlocked"))?;

        Ok(row.into_domain())
    }

    /// Get all of a user's unlocks joined with achievement detail, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn get_unlocks_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UnlockedAchievement>, RepositoryError> {
        let rows = sqlx::query_as::<_, UnlockJoinRow>(&format!(
            "SELECT {UNLOCK_JOIN_COLUMNS} \
             FROM user_achievements ua \
             JOIN achievements a ON a.id = ua.achievement_id \
             WHERE ua.user_id = $1 \
             ORDER BY ua.unlocked_at DESC, ua.id DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(UnlockJoinRow::into_domain).collect()
    }
}
