//! End-to-end tests for the progression engine.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The seeded catalog (`fithero-cli seed --file crates/cli/seeds/catalog.yaml`)
//! - The server running with `FITHERO_DEV_LOGIN=true`
//!
//! Run with: cargo test -p fithero-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;

use fithero_integration_tests::{base_url, session_client, sign_in, unique_email};

/// Set the signed-in user's point balance through the profile endpoint.
async fn set_points(client: &reqwest::Client, points: i64) -> Value {
    let resp = client
        .put(format!("{}/api/profile", base_url()))
        .json(&serde_json::json!({ "points": points }))
        .send()
        .await
        .expect("profile update failed");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("invalid profile JSON")
}

/// Generate (or fetch) the signed-in user's daily batch.
async fn generate_batch(client: &reqwest::Client) -> Vec<Value> {
    let resp = client
        .post(format!("{}/api/tasks/daily/generate", base_url()))
        .send()
        .await
        .expect("generate request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("invalid batch JSON")
}

/// Current user via /api/me.
async fn me(client: &reqwest::Client) -> Value {
    let resp = client
        .get(format!("{}/api/me", base_url()))
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("invalid me JSON")
}

#[tokio::test]
#[ignore = "Requires running server with FITHERO_DEV_LOGIN=true and seeded catalog"]
async fn test_health() {
    let resp = reqwest::get(format!("{}/health", base_url()))
        .await
        .expect("health request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server with FITHERO_DEV_LOGIN=true and seeded catalog"]
async fn test_me_requires_auth() {
    let resp = reqwest::get(format!("{}/api/me", base_url()))
        .await
        .expect("me request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server with FITHERO_DEV_LOGIN=true and seeded catalog"]
async fn test_generate_daily_tasks_is_idempotent() {
    let client = session_client();
    sign_in(&client, &unique_email("idempotent")).await;

    let first = generate_batch(&client).await;
    assert!(!first.is_empty());
    assert!(first.len() <= 3);

    // Every assignment starts incomplete with a frozen positive reward
    for assignment in &first {
        assert_eq!(assignment["completed"], Value::Bool(false));
        assert!(assignment["points"].as_i64().expect("points") >= 0);
    }

    // A second call returns the same batch, not a new one
    let second = generate_batch(&client).await;
    let ids = |batch: &[Value]| -> Vec<i64> {
        batch
            .iter()
            .map(|a| a["id"].as_i64().expect("assignment id"))
            .collect()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
#[ignore = "Requires running server with FITHERO_DEV_LOGIN=true and seeded catalog"]
async fn test_complete_task_credits_points_and_levels_up() {
    let client = session_client();
    sign_in(&client, &unique_email("levelup")).await;

    // Park the balance just under the first threshold
    let user = set_points(&client, 95).await;
    assert_eq!(user["level"].as_i64(), Some(1));

    let batch = generate_batch(&client).await;
    let assignment = batch.first().expect("batch is non-empty");
    let assignment_id = assignment["id"].as_i64().expect("assignment id");
    let reward = assignment["points"].as_i64().expect("frozen points");

    let resp = client
        .post(format!(
            "{}/api/tasks/daily/{assignment_id}/complete",
            base_url()
        ))
        .send()
        .await
        .expect("complete request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let completed: Value = resp.json().await.expect("invalid completion JSON");

    assert_eq!(completed["points_earned"].as_i64(), Some(reward));
    assert_eq!(completed["daily_task"]["completed"], Value::Bool(true));

    // Balance, level, and character moved together in the same update
    let expected_points = 95 + reward;
    assert_eq!(completed["user"]["points"].as_i64(), Some(expected_points));
    if (100..300).contains(&expected_points) {
        assert_eq!(completed["user"]["level"].as_i64(), Some(2));
        assert_eq!(
            completed["user"]["character"].as_str(),
            Some("Bronze Warrior")
        );
    }

    let profile = me(&client).await;
    assert_eq!(profile["points"].as_i64(), Some(expected_points));
}

#[tokio::test]
#[ignore = "Requires running server with FITHERO_DEV_LOGIN=true and seeded catalog"]
async fn test_complete_task_twice_does_not_double_credit() {
    let client = session_client();
    sign_in(&client, &unique_email("doublecredit")).await;

    let batch = generate_batch(&client).await;
    let assignment_id = batch.first().expect("batch is non-empty")["id"]
        .as_i64()
        .expect("assignment id");

    let complete_url = format!("{}/api/tasks/daily/{assignment_id}/complete", base_url());

    let first = client.post(&complete_url).send().await.expect("request failed");
    assert_eq!(first.status(), StatusCode::OK);
    let balance_after_first = me(&client).await["points"].as_i64().expect("points");

    let second = client.post(&complete_url).send().await.expect("request failed");
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: Value = second.json().await.expect("invalid error JSON");
    assert_eq!(body["error"].as_str(), Some("task_already_completed"));

    // No double credit
    let balance_after_second = me(&client).await["points"].as_i64().expect("points");
    assert_eq!(balance_after_first, balance_after_second);
}

#[tokio::test]
#[ignore = "Requires running server with FITHERO_DEV_LOGIN=true and seeded catalog"]
async fn test_cannot_complete_another_users_task() {
    let owner = session_client();
    sign_in(&owner, &unique_email("owner")).await;
    let batch = generate_batch(&owner).await;
    let assignment_id = batch.first().expect("batch is non-empty")["id"]
        .as_i64()
        .expect("assignment id");

    let intruder = session_client();
    sign_in(&intruder, &unique_email("intruder")).await;

    let resp = intruder
        .post(format!(
            "{}/api/tasks/daily/{assignment_id}/complete",
            base_url()
        ))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.expect("invalid error JSON");
    assert_eq!(body["error"].as_str(), Some("access_denied"));
}

#[tokio::test]
#[ignore = "Requires running server with FITHERO_DEV_LOGIN=true and seeded catalog"]
async fn test_unlock_achievement_lifecycle() {
    let client = session_client();
    sign_in(&client, &unique_email("unlock")).await;

    // Pick the cheapest non-free achievement from the catalog
    let resp = client
        .get(format!("{}/api/achievements", base_url()))
        .send()
        .await
        .expect("catalog request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let catalog: Vec<Value> = resp.json().await.expect("invalid catalog JSON");
    let achievement = catalog
        .iter()
        .filter(|a| a["cost"].as_i64().unwrap_or(0) > 0)
        .min_by_key(|a| a["cost"].as_i64().unwrap_or(i64::MAX))
        .expect("catalog has a non-free achievement");
    let achievement_id = achievement["id"].as_i64().expect("achievement id");
    let cost = achievement["cost"].as_i64().expect("achievement cost");

    let unlock_url = format!("{}/api/achievements/{achievement_id}/unlock", base_url());

    // Broke: the unlock is refused and nothing is debited
    let broke = client.post(&unlock_url).send().await.expect("request failed");
    assert_eq!(broke.status(), StatusCode::BAD_REQUEST);
    let body: Value = broke.json().await.expect("invalid error JSON");
    assert_eq!(body["error"].as_str(), Some("insufficient_points"));
    assert_eq!(me(&client).await["points"].as_i64(), Some(0));

    // Fund exactly the cost, unlock, and the balance drains to zero
    set_points(&client, cost).await;
    let unlocked = client.post(&unlock_url).send().await.expect("request failed");
    assert_eq!(unlocked.status(), StatusCode::CREATED);
    let unlock_body: Value = unlocked.json().await.expect("invalid unlock JSON");
    assert_eq!(
        unlock_body["achievement"]["id"].as_i64(),
        Some(achievement_id)
    );
    assert_eq!(me(&client).await["points"].as_i64(), Some(0));

    // Exactly one unlock record exists for this achievement
    let mine = client
        .get(format!("{}/api/achievements/me", base_url()))
        .send()
        .await
        .expect("request failed");
    let mine: Vec<Value> = mine.json().await.expect("invalid unlocks JSON");
    let matching = mine
        .iter()
        .filter(|u| u["achievement_id"].as_i64() == Some(achievement_id))
        .count();
    assert_eq!(matching, 1);

    // Funding again and retrying is a conflict, balance untouched
    set_points(&client, cost).await;
    let again = client.post(&unlock_url).send().await.expect("request failed");
    assert_eq!(again.status(), StatusCode::CONFLICT);
    let body: Value = again.json().await.expect("invalid error JSON");
    assert_eq!(body["error"].as_str(), Some("achievement_already_unlocked"));
    assert_eq!(me(&client).await["points"].as_i64(), Some(cost));
}

#[tokio::test]
#[ignore = "Requires running server with FITHERO_DEV_LOGIN=true and seeded catalog"]
async fn test_leaderboard_is_sorted_and_limited() {
    // Make sure at least two users exist with distinct balances
    let alice = session_client();
    sign_in(&alice, &unique_email("alice")).await;
    set_points(&alice, 500).await;

    let bob = session_client();
    sign_in(&bob, &unique_email("bob")).await;
    set_points(&bob, 50).await;

    let resp = reqwest::get(format!("{}/api/leaderboard?limit=5", base_url()))
        .await
        .expect("leaderboard request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let board: Vec<Value> = resp.json().await.expect("invalid leaderboard JSON");

    assert!(board.len() <= 5);
    let points: Vec<i64> = board
        .iter()
        .map(|u| u["points"].as_i64().expect("points"))
        .collect();
    let mut sorted = points.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(points, sorted, "leaderboard must be sorted by points desc");
}
