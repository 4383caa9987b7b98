//! Google OAuth route handlers.
//!
//! Handles the OAuth flow for Google sign-in:
//! - Login: Redirects to Google's OAuth authorization page
//! - Callback: Validates state, exchanges the code, resolves the user, and
//!   stores the signed-in user in the session
//! - Logout: Clears the session
//!
//! Browser-facing steps redirect back to the frontend; API consumers use
//! `/api/me` to read the signed-in profile afterwards.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User, session_keys};
use crate::services::GoogleAuthService;
use crate::state::AppState;

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Request body for the dev login endpoint.
#[derive(Debug, Deserialize)]
pub struct DevLoginRequest {
    /// Account email; the account is created if it doesn't exist.
    pub email: String,
    /// Optional explicit username for a created account.
    pub username: Option<String>,
}

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Where browser-facing auth steps land after finishing.
fn frontend_origin(state: &AppState) -> String {
    state
        .config()
        .cors_origins
        .first()
        .cloned()
        .unwrap_or_else(|| state.config().base_url.clone())
}

/// Initiate Google OAuth login.
///
/// Generates a CSRF state parameter, stores it in the session, and
/// redirects to Google's authorization page.
///
/// # Route
///
/// `GET /api/auth/google`
pub async fn google_login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_random_string(32);

    // Store in session for validation on callback
    if let Err(e) = session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        let frontend = frontend_origin(&state);
        return Redirect::to(&format!("{frontend}/login?error=session")).into_response();
    }

    let auth = GoogleAuthService::new(state.pool(), &state.config().google, state.http());
    let auth_url =
        auth.authorization_url(&state.config().oauth_redirect_uri(), &oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the Google OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code,
/// resolves the Google profile to a local user, and stores the signed-in
/// user in the session.
///
/// # Route
///
/// `GET /api/auth/google/callback`
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let frontend = frontend_origin(&state);

    // Check for OAuth errors from Google
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("Google OAuth error: {} - {}", error, description);
        return Redirect::to(&format!("{frontend}/login?error=denied")).into_response();
    }

    // Verify we have an authorization code
    let Some(code) = query.code else {
        tracing::warn!("Google OAuth callback missing code");
        return Redirect::to(&format!("{frontend}/login?error=missing_code")).into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("Google OAuth callback missing state");
        return Redirect::to(&format!("{frontend}/login?error=missing_state")).into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("Google OAuth state mismatch");
        return Redirect::to(&format!("{frontend}/login?error=invalid_state")).into_response();
    }

    // Clear the stored state (one-time use)
    let _ = session.remove::<String>(session_keys::OAUTH_STATE).await;

    // Exchange the code and resolve the user
    let auth = GoogleAuthService::new(state.pool(), &state.config().google, state.http());
    let user = match auth
        .sign_in_with_code(&code, &state.config().oauth_redirect_uri())
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Google sign-in failed: {}", e);
            return Redirect::to(&format!("{frontend}/login?error=sign_in_failed"))
                .into_response();
        }
    };

    if let Err(e) = establish_session(&session, &user).await {
        tracing::error!("Failed to store signed-in user in session: {}", e);
        return Redirect::to(&format!("{frontend}/login?error=session")).into_response();
    }

    tracing::info!(user_id = %user.id, "user signed in via Google");

    Redirect::to(&format!("{frontend}/")).into_response()
}

/// Log out: clear the signed-in user from the session.
///
/// # Route
///
/// `POST /api/auth/logout`
///
/// # Errors
///
/// Returns `AppError::Internal` if the session cannot be modified.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Email-only sign-in for local development and end-to-end tests.
///
/// Disabled unless `FITHERO_DEV_LOGIN` is set; in that case the route
/// answers 404 so it is indistinguishable from not existing.
///
/// # Route
///
/// `POST /api/auth/dev-login`
///
/// # Errors
///
/// Returns `AppError::NotFound` when dev login is disabled, or the sign-in
/// error otherwise.
pub async fn dev_login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<DevLoginRequest>,
) -> Result<Json<User>> {
    if !state.config().dev_login {
        return Err(AppError::NotFound("not found".to_owned()));
    }

    let auth = GoogleAuthService::new(state.pool(), &state.config().google, state.http());
    let user = auth.dev_sign_in(&req.email, req.username.as_deref()).await?;

    establish_session(&session, &user)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(Json(user))
}

/// Store the signed-in user in the session.
async fn establish_session(
    session: &Session,
    user: &User,
) -> std::result::Result<(), tower_sessions::session::Error> {
    set_current_user(
        session,
        &CurrentUser {
            user_id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
        },
    )
    .await
}
