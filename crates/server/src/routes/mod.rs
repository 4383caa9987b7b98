//! HTTP route handlers for the FitHero JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (pings the database)
//!
//! # Auth
//! GET  /api/auth/google                 - Redirect to Google OAuth
//! GET  /api/auth/google/callback        - Handle OAuth callback, set session
//! POST /api/auth/logout                 - Clear the session
//! POST /api/auth/dev-login              - Email-only sign-in (dev/test builds only)
//! GET  /api/me                          - Current user profile
//!
//! # Tasks
//! GET  /api/tasks                       - Task catalog (public)
//! GET  /api/tasks/{id}                  - Catalog task detail (public)
//! GET  /api/tasks/daily                 - Current user's assignments
//! POST /api/tasks/daily/generate        - Generate (or return) the daily batch
//! POST /api/tasks/daily/{id}/complete   - Complete an assignment, credit points
//!
//! # Achievements
//! GET  /api/achievements                - Achievement catalog (public)
//! GET  /api/achievements/me             - Current user's unlocks
//! POST /api/achievements/{id}/unlock    - Unlock an achievement (debit points)
//!
//! # Users
//! GET  /api/users/{id}                  - User profile by ID
//! PUT  /api/profile                     - Update own profile
//! DELETE /api/profile                   - Soft-delete own account
//! GET  /api/leaderboard?limit=N         - Top users by points (public)
//! ```

pub mod achievements;
pub mod auth;
pub mod tasks;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/google", get(auth::google_login))
        .route("/google/callback", get(auth::google_callback))
        .route("/logout", post(auth::logout))
        .route("/dev-login", post(auth::dev_login))
}

/// Create the task routes router.
pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks))
        .route("/daily", get(tasks::my_daily_tasks))
        .route("/daily/generate", post(tasks::generate_daily_tasks))
        .route("/daily/{id}/complete", post(tasks::complete_task))
        .route("/{id}", get(tasks::get_task))
}

/// Create the achievement routes router.
pub fn achievement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(achievements::list_achievements))
        .route("/me", get(achievements::my_unlocks))
        .route("/{id}/unlock", post(achievements::unlock_achievement))
}

/// Create the user routes router (top-level paths).
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(users::me))
        .route("/api/users/{id}", get(users::get_user))
        .route(
            "/api/profile",
            put(users::update_profile).delete(users::delete_profile),
        )
        .route("/api/leaderboard", get(users::leaderboard))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/tasks", task_routes())
        .nest("/api/achievements", achievement_routes())
        .merge(user_routes())
}
