//! Task service: daily-task assignment and completion.
//!
//! Assignment follows the level-gated persistent-batch model: a user's batch
//! is created once and returned unchanged on every later call until it is
//! administratively reset. Completion is a two-phase operation - flag first,
//! credit second - with a compensating revert if the credit fails; the
//! revert itself is best effort and not retried.

use sqlx::PgPool;
use thiserror::Error;

use fithero_core::{AssignmentId, Points, TaskId, UserId};

use super::ledger::{LedgerError, PointLedger};
use crate::db::{RepositoryError, TaskRepository, UserRepository};
use crate::models::{DailyTask, Task, User};

/// Number of tasks in a daily batch (fewer if the catalog is smaller).
const MAX_DAILY_TASKS: usize = 3;

/// Errors that can occur during task operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// User is absent or deactivated.
    #[error("user not found")]
    UserNotFound,

    /// Catalog task does not exist.
    #[error("task not found")]
    TaskNotFound,

    /// Assignment does not exist.
    #[error("daily task not found")]
    AssignmentNotFound,

    /// Assignment belongs to a different user.
    #[error("access denied: you can only complete your own tasks")]
    AccessDenied,

    /// Assignment is already completed; points were credited the first time.
    #[error("task already completed")]
    AlreadyCompleted,

    /// No catalog tasks exist at or below the user's level.
    #[error("no tasks available for user level")]
    NoTasksAvailable,

    /// The completion flag was set but the point credit failed; the flag was
    /// reverted (best effort) and the task did NOT end up credited.
    #[error("points award failed: {0}")]
    AwardFailed(#[source] LedgerError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of a successful completion: the assignment plus what it paid out.
#[derive(Debug)]
pub struct CompletedTask {
    /// The assignment, now flagged completed.
    pub assignment: DailyTask,
    /// Points credited to the user.
    pub points_awarded: Points,
    /// The user after the credit (updated balance, level, character).
    pub user: User,
}

/// Service for the task catalog, daily-task assignment, and completion.
pub struct TaskService<'a> {
    tasks: TaskRepository<'a>,
    users: UserRepository<'a>,
    ledger: PointLedger<'a>,
}

impl<'a> TaskService<'a> {
    /// Create a new task service over the given pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            tasks: TaskRepository::new(pool),
            users: UserRepository::new(pool),
            ledger: PointLedger::new(pool),
        }
    }

    /// All catalog tasks (public endpoint).
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Repository` if the query fails.
    pub async fn list_catalog(&self) -> Result<Vec<Task>, TaskError> {
        Ok(self.tasks.get_all().await?)
    }

    /// A single catalog task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::TaskNotFound` if it doesn't exist.
    pub async fn get_task(&self, task_id: TaskId) -> Result<Task, TaskError> {
        self.tasks
            .get_by_id(task_id)
            .await?
            .ok_or(TaskError::TaskNotFound)
    }

    /// A user's current assignments.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::UserNotFound` if the user is absent or inactive.
    pub async fn assignments_for_user(&self, user_id: UserId) -> Result<Vec<DailyTask>, TaskError> {
        self.load_active_user(user_id).await?;
        Ok(self.tasks.get_assignments_for_user(user_id).await?)
    }

    /// Generate the user's daily-task batch, or return the existing one.
    ///
    /// Idempotent: if the user already holds assignments they are returned
    /// unchanged, completed or not. Otherwise up to [`MAX_DAILY_TASKS`]
    /// catalog tasks at or below the user's level are assigned, each with
    /// its point value frozen in.
    ///
    /// A partial-creation failure is surfaced as `Repository` with no
    /// automatic cleanup of the rows already written.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::UserNotFound` if the user is absent or inactive.
    /// Returns `TaskError::NoTasksAvailable` if the level-filtered catalog
    /// is empty.
    pub async fn generate_daily_tasks(&self, user_id: UserId) -> Result<Vec<DailyTask>, TaskError> {
        let user = self.load_active_user(user_id).await?;

        let existing = self.tasks.get_assignments_for_user(user_id).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let candidates = self.tasks.get_by_max_level(user.level).await?;
        if candidates.is_empty() {
            return Err(TaskError::NoTasksAvailable);
        }

        let mut batch = Vec::with_capacity(batch_size(candidates.len()));
        for task in candidates.iter().take(MAX_DAILY_TASKS) {
            match self
                .tasks
                .create_assignment(user_id, task.id, task.points)
                .await
            {
                Ok(assignment) => batch.push(assignment),
                // A concurrent generate won the race; return its batch.
                Err(RepositoryError::Conflict(_)) => {
                    return Ok(self.tasks.get_assignments_for_user(user_id).await?);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(batch)
    }

    /// Complete an assignment and credit its frozen points.
    ///
    /// Two-phase: the completion flag is persisted first, then the ledger
    /// credit runs. If the credit fails the flag is reverted (best effort)
    /// and `AwardFailed` is returned so the caller knows the task was NOT
    /// credited.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::AssignmentNotFound` if the assignment is absent.
    /// Returns `TaskError::AccessDenied` if it belongs to another user.
    /// Returns `TaskError::AlreadyCompleted` if it was completed before -
    /// points are never credited twice.
    /// Returns `TaskError::AwardFailed` if the credit failed after the flag
    /// was set.
    pub async fn complete_task(
        &self,
        user_id: UserId,
        assignment_id: AssignmentId,
    ) -> Result<CompletedTask, TaskError> {
        let mut assignment = self
            .tasks
            .get_assignment(assignment_id)
            .await?
            .ok_or(TaskError::AssignmentNotFound)?;

        if assignment.user_id != user_id {
            return Err(TaskError::AccessDenied);
        }

        if assignment.completed {
            return Err(TaskError::AlreadyCompleted);
        }

        self.tasks.set_completed(assignment_id, true).await?;

        let user = match self.ledger.credit(user_id, assignment.points).await {
            Ok(user) => user,
            Err(e) => {
                // Compensate: the flag is set but no points landed. Revert so
                // the task can be retried; a failed revert leaves a completed
                // but uncredited task that needs manual reconciliation.
                if let Err(revert_err) = self.tasks.set_completed(assignment_id, false).await {
                    tracing::error!(
                        assignment_id = %assignment_id,
                        user_id = %user_id,
                        error = %revert_err,
                        "failed to revert completion flag after credit failure; \
                         assignment is completed but uncredited"
                    );
                }
                return Err(TaskError::AwardFailed(e));
            }
        };

        assignment.completed = true;
        let points_awarded = assignment.points;

        Ok(CompletedTask {
            assignment,
            points_awarded,
            user,
        })
    }

    async fn load_active_user(&self, user_id: UserId) -> Result<User, TaskError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(TaskError::UserNotFound)?;

        if !user.is_active {
            return Err(TaskError::UserNotFound);
        }

        Ok(user)
    }
}

/// How many assignments a batch gets for a catalog of `available` tasks.
const fn batch_size(available: usize) -> usize {
    if available < MAX_DAILY_TASKS {
        available
    } else {
        MAX_DAILY_TASKS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_size_caps_at_three() {
        assert_eq!(batch_size(0), 0);
        assert_eq!(batch_size(1), 1);
        assert_eq!(batch_size(2), 2);
        assert_eq!(batch_size(3), 3);
        assert_eq!(batch_size(10), 3);
    }
}
