//! Task repository: catalog reads and daily-task assignments.
//!
//! The `(user_id, task_id)` unique constraint on `daily_tasks` is the
//! backstop for concurrent batch generation: two racing generators both pass
//! the "no existing batch" check, but only one set of inserts can win.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use fithero_core::{AssignmentId, Points, TaskCategory, TaskDifficulty, TaskId, UserId};

use super::RepositoryError;
use crate::models::{DailyTask, Task};

/// Database row for a catalog task, validated into [`Task`] on read.
#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i32,
    title: String,
    description: String,
    points: i32,
    category: String,
    difficulty: String,
    min_level: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_domain(self) -> Result<Task, RepositoryError> {
        let points = Points::new(self.points).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid task points in database: {e}"))
        })?;
        let category = self.category.parse::<TaskCategory>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid value in database: {e}"))
        })?;
        let difficulty = self.difficulty.parse::<TaskDifficulty>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid value in database: {e}"))
        })?;

        Ok(Task {
            id: TaskId::new(self.id),
            title: self.title,
            description: self.description,
            points,
            category,
            difficulty,
            min_level: self.min_level,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for an assignment, validated into [`DailyTask`] on read.
#[derive(sqlx::FromRow)]
struct DailyTaskRow {
    id: i32,
    user_id: i32,
    task_id: i32,
    points: i32,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DailyTaskRow {
    fn into_domain(self) -> Result<DailyTask, RepositoryError> {
        let points = Points::new(self.points).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid frozen points in database: {e}"))
        })?;

        Ok(DailyTask {
            id: AssignmentId::new(self.id),
            user_id: UserId::new(self.user_id),
            task_id: TaskId::new(self.task_id),
            points,
            completed: self.completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const TASK_COLUMNS: &str =
    "id, title, description, points, category, difficulty, min_level, created_at, updated_at";

const DAILY_TASK_COLUMNS: &str =
    "id, user_id, task_id, points, completed, created_at, updated_at";

/// Repository for the task catalog and daily-task assignments.
pub struct TaskRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TaskRepository<'a> {
    /// Create a new task repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get all catalog tasks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn get_all(&self) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TaskRow::into_domain).collect()
    }

    /// Get a catalog task by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TaskRow::into_domain).transpose()
    }

    /// Get catalog tasks a user of the given level may be assigned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn get_by_max_level(&self, level: i32) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE min_level <= $1 ORDER BY id"
        ))
        .bind(level)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TaskRow::into_domain).collect()
    }

    // =========================================================================
    // Assignments
    // =========================================================================

    /// Get all assignments for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn get_assignments_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<DailyTask>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailyTaskRow>(&format!(
            "SELECT {DAILY_TASK_COLUMNS} FROM daily_tasks WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(DailyTaskRow::into_domain).collect()
    }

    /// Get an assignment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<Option<DailyTask>, RepositoryError> {
        let row = sqlx::query_as::<_, DailyTaskRow>(&format!(
            "SELECT {DAILY_TASK_COLUMNS} FROM daily_tasks WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(DailyTaskRow::into_domain).transpose()
    }

    /// Create an assignment with the task's point value frozen in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already holds an
    /// assignment for this task (concurrent generation lost the race).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_assignment(
        &self,
        user_id: UserId,
        task_id: TaskId,
        points: Points,
    ) -> Result<DailyTask, RepositoryError> {
        let row = sqlx::query_as::<_, DailyTaskRow>(&format!(
            "INSERT INTO daily_tasks (user_id, task_id, points) \
             VALUES ($1, $2, $3) \
             RETURNING {DAILY_TASK_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(task_id.as_i32())
        .bind(points.as_i32())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "assignment already exists"))?;

        row.into_domain()
    }

    /// Set an assignment's completion flag.
    ///
    /// Used both to mark completion and to revert it when the downstream
    /// point credit fails.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the assignment doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_completed(
        &self,
        id: AssignmentId,
        completed: bool,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE daily_tasks SET completed = $2, updated_at = NOW() WHERE id = $1")
                .bind(id.as_i32())
                .bind(completed)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
