//! Achievement service: catalog reads and the unlock handler.
//!
//! Unlocking is a saga: debit the cost, create the unlock record, then apply
//! the achievement's side effect. A failed record creation triggers a
//! compensating credit; the compensation itself is not retried, and its
//! failure is surfaced loudly in the logs rather than swallowed.

use sqlx::PgPool;
use thiserror::Error;

use fithero_core::{AchievementId, AchievementKind, Points, UserId, progression};

use super::ledger::{LedgerError, PointLedger};
use crate::db::{AchievementRepository, RepositoryError, UserRepository};
use crate::models::{Achievement, UnlockedAchievement};

/// Errors that can occur during achievement operations.
#[derive(Debug, Error)]
pub enum AchievementError {
    /// User is absent or deactivated.
    #[error("user not found")]
    UserNotFound,

    /// Achievement does not exist in the catalog.
    #[error("achievement not found")]
    AchievementNotFound,

    /// The user has already unlocked this achievement.
    #[error("achievement already unlocked")]
    AlreadyUnlocked,

    /// Balance is lower than the unlock cost; nothing was debited.
    #[error("insufficient points to unlock achievement: need {required}, have {available}")]
    InsufficientFunds {
        /// The achievement's cost.
        required: Points,
        /// Balance at the time of the check.
        available: Points,
    },

    /// The debit succeeded but the unlock record could not be created; a
    /// compensating credit was attempted.
    #[error("failed to unlock achievement: {0}")]
    UnlockFailed(#[source] RepositoryError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<LedgerError> for AchievementError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::UserNotFound => Self::UserNotFound,
            LedgerError::InsufficientFunds {
                required,
                available,
            } => Self::InsufficientFunds {
                required,
                available,
            },
            LedgerError::Repository(e) => Self::Repository(e),
        }
    }
}

/// Service for the achievement catalog and unlocks.
pub struct AchievementService<'a> {
    achievements: AchievementRepository<'a>,
    users: UserRepository<'a>,
    ledger: PointLedger<'a>,
}

impl<'a> AchievementService<'a> {
    /// Create a new achievement service over the given pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            achievements: AchievementRepository::new(pool),
            users: UserRepository::new(pool),
            ledger: PointLedger::new(pool),
        }
    }

    /// All catalog achievements (public endpoint).
    ///
    /// # Errors
    ///
    /// Returns `AchievementError::Repository` if the query fails.
    pub async fn list_catalog(&self) -> Result<Vec<Achievement>, AchievementError> {
        Ok(self.achievements.get_all().await?)
    }

    /// A user's unlocks joined with achievement detail.
    ///
    /// # Errors
    ///
    /// Returns `AchievementError::UserNotFound` if the user is absent or
    /// inactive.
    pub async fn unlocks_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UnlockedAchievement>, AchievementError> {
        self.load_active_user(user_id).await?;
        Ok(self.achievements.get_unlocks_for_user(user_id).await?)
    }

    /// Unlock an achievement: debit the cost, record the unlock, apply the
    /// side effect.
    ///
    /// The debit and the record insert are not one transaction. If the
    /// insert fails, the cost is credited back (best effort, not retried)
    /// before the error is surfaced. A concurrent unlock that wins the
    /// insert race is reported as `AlreadyUnlocked` after the refund.
    ///
    /// # Errors
    ///
    /// Returns `AchievementError::UserNotFound` /
    /// `AchievementError::AchievementNotFound` if either party is absent.
    /// Returns `AchievementError::AlreadyUnlocked` on a duplicate unlock;
    /// the balance is unchanged.
    /// Returns `AchievementError::InsufficientFunds` if the balance is
    /// below the cost; nothing is debited.
    /// Returns `AchievementError::UnlockFailed` if the record insert failed
    /// after the debit.
    pub async fn unlock_achievement(
        &self,
        user_id: UserId,
        achievement_id: AchievementId,
    ) -> Result<UnlockedAchievement, AchievementError> {
        let user = self.load_active_user(user_id).await?;

        let achievement = self
            .achievements
            .get_by_id(achievement_id)
            .await?
            .ok_or(AchievementError::AchievementNotFound)?;

        if self.achievements.is_unlocked(user_id, achievement_id).await? {
            return Err(AchievementError::AlreadyUnlocked);
        }

        if user.points < achievement.cost {
            return Err(AchievementError::InsufficientFunds {
                required: achievement.cost,
                available: user.points,
            });
        }

        self.ledger.debit(user_id, achievement.cost).await?;

        let unlock = match self.achievements.create_unlock(user_id, achievement_id).await {
            Ok(unlock) => unlock,
            Err(e) => {
                let refunded = self.refund(user_id, achievement.cost).await;
                // The unique constraint caught a concurrent unlock: once the
                // refund lands this is a plain duplicate, not a fault. A
                // failed refund is a fault no matter what triggered it.
                if refunded && matches!(e, RepositoryError::Conflict(_)) {
                    return Err(AchievementError::AlreadyUnlocked);
                }
                return Err(AchievementError::UnlockFailed(e));
            }
        };

        self.apply_side_effect(user_id, &achievement).await;

        Ok(UnlockedAchievement {
            unlock,
            achievement,
        })
    }

    /// Credit back a debited cost after a failed unlock insert.
    ///
    /// Returns whether the refund landed. Not retried on failure.
    async fn refund(&self, user_id: UserId, cost: Points) -> bool {
        match self.ledger.credit(user_id, cost).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    cost = %cost,
                    error = %e,
                    "failed to refund points after unlock failure; \
                     balance is short and needs manual reconciliation"
                );
                false
            }
        }
    }

    /// Apply the unlocked achievement's effect on the user's display state.
    ///
    /// Failures here never fail the unlock - the debit and the record are
    /// already in place - but they are logged.
    async fn apply_side_effect(&self, user_id: UserId, achievement: &Achievement) {
        let result = match achievement.kind {
            AchievementKind::Character => {
                self.users.set_character(user_id, &achievement.title).await
            }
            AchievementKind::JobTitle => {
                match progression::job_title_for_achievement(&achievement.title) {
                    Some(job_title) => self.users.set_job_title(user_id, job_title).await,
                    // Title not in the grant table: no side effect, no error
                    None => Ok(()),
                }
            }
            AchievementKind::Badge => Ok(()),
        };

        if let Err(e) = result {
            tracing::warn!(
                user_id = %user_id,
                achievement_id = %achievement.id,
                error = %e,
                "achievement unlocked but side effect was not applied"
            );
        }
    }

    async fn load_active_user(
        &self,
        user_id: UserId,
    ) -> Result<crate::models::User, AchievementError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AchievementError::UserNotFound)?;

        if !user.is_active {
            return Err(AchievementError::UserNotFound);
        }

        Ok(user)
    }
}
