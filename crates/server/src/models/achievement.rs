//! Achievement catalog and unlock domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fithero_core::{AchievementId, AchievementKind, Points, UnlockId, UserId};

/// A catalog achievement (domain type).
///
/// Immutable reference data. `cost` is debited from the user's balance on
/// unlock; `kind` decides the side effect applied afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    /// Unique achievement ID.
    pub id: AchievementId,
    /// Title; doubles as the granted character name or the job-title table
    /// key depending on `kind`.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Icon identifier for the frontend.
    pub icon: String,
    /// Points debited on unlock.
    pub cost: Points,
    /// What unlocking this achievement does beyond the debit.
    pub kind: AchievementKind,
    /// When the achievement was created.
    pub created_at: DateTime<Utc>,
    /// When the achievement was last updated.
    pub updated_at: DateTime<Utc>,
}

/// An unlock record: one user unlocked one achievement (domain type).
///
/// Unique per (user, achievement) - enforced by the engine's existence check
/// with a database unique constraint as the backstop.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementUnlock {
    /// Unique unlock ID.
    pub id: UnlockId,
    /// User who unlocked the achievement.
    pub user_id: UserId,
    /// The unlocked achievement.
    pub achievement_id: AchievementId,
    /// When the unlock happened.
    pub unlocked_at: DateTime<Utc>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// An unlock record joined with its achievement detail.
#[derive(Debug, Clone, Serialize)]
pub struct UnlockedAchievement {
    /// The unlock record.
    #[serde(flatten)]
    pub unlock: AchievementUnlock,
    /// The achievement that was unlocked.
    pub achievement: Achievement,
}
