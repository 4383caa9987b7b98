//! Task catalog and assignment domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fithero_core::{AssignmentId, Points, TaskCategory, TaskDifficulty, TaskId, UserId};

/// A catalog task (domain type).
///
/// Immutable reference data, curated administratively. The engine only reads
/// these rows.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    /// Unique task ID.
    pub id: TaskId,
    /// Short title shown to the user.
    pub title: String,
    /// Longer description of what to do.
    pub description: String,
    /// Points awarded on completion.
    pub points: Points,
    /// Category (cardio, strength, ...).
    pub category: TaskCategory,
    /// Difficulty rating.
    pub difficulty: TaskDifficulty,
    /// Minimum user level required to be assigned this task.
    pub min_level: i32,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A task assigned to a user (domain type).
///
/// The point value is frozen at assignment time so later catalog edits never
/// change the reward retroactively.
#[derive(Debug, Clone, Serialize)]
pub struct DailyTask {
    /// Unique assignment ID.
    pub id: AssignmentId,
    /// User the task is assigned to.
    pub user_id: UserId,
    /// Catalog task this assignment was created from.
    pub task_id: TaskId,
    /// Reward frozen at assignment time.
    pub points: Points,
    /// Whether the user has completed this assignment.
    pub completed: bool,
    /// When the assignment was created.
    pub created_at: DateTime<Utc>,
    /// When the assignment was last updated.
    pub updated_at: DateTime<Utc>,
}
