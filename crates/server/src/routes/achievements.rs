//! Achievement route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use fithero_core::AchievementId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Achievement, UnlockedAchievement};
use crate::services::AchievementService;
use crate::state::AppState;

/// List the achievement catalog.
///
/// `GET /api/achievements`
///
/// # Errors
///
/// Returns `AppError` if the catalog read fails.
pub async fn list_achievements(
    State(state): State<AppState>,
) -> Result<Json<Vec<Achievement>>> {
    let achievements = AchievementService::new(state.pool()).list_catalog().await?;
    Ok(Json(achievements))
}

/// List the current user's unlocks with achievement detail.
///
/// `GET /api/achievements/me`
///
/// # Errors
///
/// Returns `AppError` if the user is unknown or the read fails.
pub async fn my_unlocks(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<UnlockedAchievement>>> {
    let unlocks = AchievementService::new(state.pool())
        .unlocks_for_user(user.user_id)
        .await?;
    Ok(Json(unlocks))
}

/// Unlock an achievement for the current user.
///
/// `POST /api/achievements/{id}/unlock`
///
/// # Errors
///
/// Returns `AppError` with `achievement_not_found`,
/// `achievement_already_unlocked`, `insufficient_points`, or
/// `unlock_failed` per the unlock contract.
pub async fn unlock_achievement(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<UnlockedAchievement>)> {
    let unlocked = AchievementService::new(state.pool())
        .unlock_achievement(user.user_id, AchievementId::new(id))
        .await?;

    Ok((StatusCode::CREATED, Json(unlocked)))
}
