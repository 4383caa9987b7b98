//! User route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tower_sessions::Session;

use fithero_core::UserId;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, clear_current_user};
use crate::models::User;
use crate::services::{UpdateProfile, UserService};
use crate::state::AppState;

/// Query parameters for the leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Number of entries (default 10, max 100).
    pub limit: Option<i64>,
}

/// Current user's profile.
///
/// `GET /api/me`
///
/// # Errors
///
/// Returns `AppError` with `user_not_found` if the account was deactivated
/// after sign-in.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<User>> {
    let user = UserService::new(state.pool()).get_user(user.user_id).await?;
    Ok(Json(user))
}

/// A user's profile by ID.
///
/// `GET /api/users/{id}`
///
/// # Errors
///
/// Returns `AppError` with `user_not_found` if absent or deactivated.
pub async fn get_user(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<User>> {
    let user = UserService::new(state.pool())
        .get_user(UserId::new(id))
        .await?;
    Ok(Json(user))
}

/// Update the current user's profile.
///
/// `PUT /api/profile`
///
/// # Errors
///
/// Returns `AppError` with `duplicate_field`, `invalid_email`, or
/// `invalid_points` on bad input.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(update): Json<UpdateProfile>,
) -> Result<Json<User>> {
    let updated = UserService::new(state.pool())
        .update_profile(user.user_id, update)
        .await?;
    Ok(Json(updated))
}

/// Soft-delete the current user's account and end the session.
///
/// `DELETE /api/profile`
///
/// # Errors
///
/// Returns `AppError` with `user_not_found` if already deactivated.
pub async fn delete_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<StatusCode> {
    UserService::new(state.pool()).delete_user(user.user_id).await?;

    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Top users by points.
///
/// `GET /api/leaderboard?limit=N`
///
/// # Errors
///
/// Returns `AppError` if the read fails.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<User>>> {
    let users = UserService::new(state.pool()).leaderboard(query.limit).await?;
    Ok(Json(users))
}
