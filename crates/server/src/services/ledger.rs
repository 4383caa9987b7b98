//! Point Ledger - the single owner of point-balance mutations.
//!
//! Every credit and debit loads the current balance, recomputes the derived
//! level and character through [`fithero_core::progression`], and persists
//! all three fields in one UPDATE. A stored balance therefore never
//! disagrees with the stored level.
//!
//! The read-modify-write here is not guarded by row locking or a
//! compare-and-swap: two concurrent mutations for the same user can lose an
//! update. Callers that need stronger guarantees must serialize per user.

use sqlx::PgPool;
use thiserror::Error;

use fithero_core::{Points, UserId, progression};

use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// User is absent or deactivated.
    #[error("user not found")]
    UserNotFound,

    /// Balance is too low for the requested debit. The balance is left
    /// untouched - there are no partial debits.
    #[error("insufficient points: need {required}, have {available}")]
    InsufficientFunds {
        /// Amount the debit asked for.
        required: Points,
        /// Balance at the time of the check.
        available: Points,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// The ledger service.
pub struct PointLedger<'a> {
    users: UserRepository<'a>,
}

impl<'a> PointLedger<'a> {
    /// Create a new ledger over the given pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Credit `amount` points to a user.
    ///
    /// Returns the user with the updated balance, level, and character.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UserNotFound` if the user is absent or inactive.
    /// Returns `LedgerError::Repository` if the write fails.
    pub async fn credit(&self, user_id: UserId, amount: Points) -> Result<User, LedgerError> {
        let user = self.load_active(user_id).await?;
        let balance = user.points.saturating_add(amount);
        self.apply(user, balance).await
    }

    /// Debit `amount` points from a user.
    ///
    /// Returns the user with the updated balance, level, and character.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UserNotFound` if the user is absent or inactive.
    /// Returns `LedgerError::InsufficientFunds` if the balance is too low;
    /// nothing is written in that case.
    /// Returns `LedgerError::Repository` if the write fails.
    pub async fn debit(&self, user_id: UserId, amount: Points) -> Result<User, LedgerError> {
        let user = self.load_active(user_id).await?;
        let balance = user
            .points
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                required: amount,
                available: user.points,
            })?;
        self.apply(user, balance).await
    }

    async fn load_active(&self, user_id: UserId) -> Result<User, LedgerError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(LedgerError::UserNotFound)?;

        if !user.is_active {
            return Err(LedgerError::UserNotFound);
        }

        Ok(user)
    }

    /// Persist a new balance and its derived state as one update.
    async fn apply(&self, mut user: User, balance: Points) -> Result<User, LedgerError> {
        let level = progression::level_for_points(balance);
        let character = progression::character_for_level(level);

        self.users
            .update_progress(user.id, balance, level, character)
            .await?;

        user.points = balance;
        user.level = level;
        user.character = character.to_owned();
        Ok(user)
    }
}
