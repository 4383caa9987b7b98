//! Task route handlers.
//!
//! The catalog endpoints are public; everything touching assignments
//! requires a signed-in user and only ever operates on that user's rows.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use fithero_core::{AssignmentId, Points, TaskId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{DailyTask, Task, User};
use crate::services::TaskService;
use crate::state::AppState;

/// Response for a completed task: the assignment, the payout, and the
/// user's refreshed progression state.
#[derive(Debug, Serialize)]
pub struct CompleteTaskResponse {
    /// The assignment, now completed.
    pub daily_task: DailyTask,
    /// Points credited by this completion.
    pub points_earned: Points,
    /// The user after the credit (balance, level, character all current).
    pub user: User,
}

/// List the task catalog.
///
/// `GET /api/tasks`
///
/// # Errors
///
/// Returns `AppError` if the catalog read fails.
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>> {
    let tasks = TaskService::new(state.pool()).list_catalog().await?;
    Ok(Json(tasks))
}

/// Get a single catalog task.
///
/// `GET /api/tasks/{id}`
///
/// # Errors
///
/// Returns `AppError` with `task_not_found` if the task doesn't exist.
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Task>> {
    let task = TaskService::new(state.pool())
        .get_task(TaskId::new(id))
        .await?;
    Ok(Json(task))
}

/// List the current user's assignments.
///
/// `GET /api/tasks/daily`
///
/// # Errors
///
/// Returns `AppError` if the user is unknown or the read fails.
pub async fn my_daily_tasks(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<DailyTask>>> {
    let assignments = TaskService::new(state.pool())
        .assignments_for_user(user.user_id)
        .await?;
    Ok(Json(assignments))
}

/// Generate the current user's daily batch, or return the existing one.
///
/// `POST /api/tasks/daily/generate`
///
/// # Errors
///
/// Returns `AppError` with `no_tasks_available` if the level-filtered
/// catalog is empty.
pub async fn generate_daily_tasks(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, Json<Vec<DailyTask>>)> {
    let batch = TaskService::new(state.pool())
        .generate_daily_tasks(user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// Complete one of the current user's assignments and credit its points.
///
/// `POST /api/tasks/daily/{id}/complete`
///
/// # Errors
///
/// Returns `AppError` with `daily_task_not_found`, `access_denied`,
/// `task_already_completed`, or `points_award_failed` per the completion
/// contract.
pub async fn complete_task(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<CompleteTaskResponse>> {
    let completed = TaskService::new(state.pool())
        .complete_task(user.user_id, AssignmentId::new(id))
        .await?;

    Ok(Json(CompleteTaskResponse {
        daily_task: completed.assignment,
        points_earned: completed.points_awarded,
        user: completed.user,
    }))
}
