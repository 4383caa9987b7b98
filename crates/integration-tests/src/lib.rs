//! Integration tests for FitHero.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL, migrate, and seed the catalog
//! cargo run -p fithero-cli -- migrate
//! cargo run -p fithero-cli -- seed --file crates/cli/seeds/catalog.yaml
//!
//! # Start the server with dev login enabled
//! FITHERO_DEV_LOGIN=true cargo run -p fithero-server
//!
//! # Run the ignored end-to-end tests
//! cargo test -p fithero-integration-tests -- --ignored
//! ```
//!
//! Tests authenticate through `POST /api/auth/dev-login`, which only exists
//! when the server runs with `FITHERO_DEV_LOGIN=true`. Each test creates its
//! own uniquely-named user so runs don't interfere.

use reqwest::Client;
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("FITHERO_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Create an HTTP client that keeps the session cookie.
///
/// # Panics
///
/// Panics if the client cannot be constructed (test-only code).
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique test email so parallel runs never collide.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.fithero.dev", Uuid::new_v4().simple())
}

/// Sign in (creating the account if needed) and return the user JSON.
///
/// # Panics
///
/// Panics if the dev-login endpoint is unreachable or rejects the request -
/// usually the server wasn't started with `FITHERO_DEV_LOGIN=true`.
pub async fn sign_in(client: &Client, email: &str) -> serde_json::Value {
    let resp = client
        .post(format!("{}/api/auth/dev-login", base_url()))
        .json(&serde_json::json!({ "email": email }))
        .send()
        .await
        .expect("dev-login request failed");

    assert!(
        resp.status().is_success(),
        "dev login failed (is FITHERO_DEV_LOGIN=true?): {}",
        resp.status()
    );

    resp.json().await.expect("dev login returned invalid JSON")
}
