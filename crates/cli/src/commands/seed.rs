//! Seed the task and achievement catalogs from a YAML file.
//!
//! The seed is idempotent: rows whose title already exists are skipped, so
//! re-running against a live database only adds what's new. Catalog rows are
//! never updated or deleted here - they may already be referenced by
//! assignments and unlocks.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use fithero_core::{AchievementKind, Points, TaskCategory, TaskDifficulty};
use fithero_server::db;

/// YAML catalog file layout.
#[derive(Debug, Deserialize)]
pub struct SeedCatalog {
    /// Task catalog entries.
    #[serde(default)]
    pub tasks: Vec<SeedTask>,
    /// Achievement catalog entries.
    #[serde(default)]
    pub achievements: Vec<SeedAchievement>,
}

/// One task entry in the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedTask {
    pub title: String,
    pub description: String,
    pub points: i32,
    pub category: String,
    pub difficulty: String,
    #[serde(default = "default_min_level")]
    pub min_level: i32,
}

/// One achievement entry in the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedAchievement {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub cost: i32,
    pub kind: String,
}

const fn default_min_level() -> i32 {
    1
}

/// Validate a parsed catalog, returning every problem found.
fn validate_catalog(catalog: &SeedCatalog) -> Vec<String> {
    let mut errors = Vec::new();

    for task in &catalog.tasks {
        if let Err(e) = Points::new(task.points) {
            errors.push(format!("task '{}': {e}", task.title));
        }
        if let Err(e) = task.category.parse::<TaskCategory>() {
            errors.push(format!("task '{}': {e}", task.title));
        }
        if let Err(e) = task.difficulty.parse::<TaskDifficulty>() {
            errors.push(format!("task '{}': {e}", task.title));
        }
        if !(1..=5).contains(&task.min_level) {
            errors.push(format!(
                "task '{}': min_level must be 1-5 (got {})",
                task.title, task.min_level
            ));
        }
    }

    for achievement in &catalog.achievements {
        if let Err(e) = Points::new(achievement.cost) {
            errors.push(format!("achievement '{}': {e}", achievement.title));
        }
        if let Err(e) = achievement.kind.parse::<AchievementKind>() {
            errors.push(format!("achievement '{}': {e}", achievement.title));
        }
    }

    errors
}

/// Seed the catalogs from a YAML file.
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot
/// be read or parsed, validation fails, or database operations fail.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = std::env::var("FITHERO_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "FITHERO_DATABASE_URL not set")?;

    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: SeedCatalog = serde_yaml::from_str(&content)?;

    info!(
        tasks = catalog.tasks.len(),
        achievements = catalog.achievements.len(),
        "Parsed catalog"
    );

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!("Catalog validated successfully");

    // Connect to database
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let (tasks_inserted, tasks_skipped) = seed_tasks(&pool, &catalog.tasks).await?;
    let (achievements_inserted, achievements_skipped) =
        seed_achievements(&pool, &catalog.achievements).await?;

    // Print summary
    info!("Seeding complete!");
    info!("  Tasks inserted: {tasks_inserted} (skipped {tasks_skipped} existing)");
    info!(
        "  Achievements inserted: {achievements_inserted} (skipped {achievements_skipped} existing)"
    );

    Ok(())
}

/// Insert tasks that don't exist yet, keyed by title.
async fn seed_tasks(pool: &PgPool, tasks: &[SeedTask]) -> Result<(u32, u32), sqlx::Error> {
    let mut inserted = 0;
    let mut skipped = 0;

    for task in tasks {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM tasks WHERE title = $1)",
        )
        .bind(&task.title)
        .fetch_one(pool)
        .await?;

        if exists {
            skipped += 1;
            continue;
        }

        sqlx::query(
            "INSERT INTO tasks (title, description, points, category, difficulty, min_level) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.points)
        .bind(&task.category)
        .bind(&task.difficulty)
        .bind(task.min_level)
        .execute(pool)
        .await?;

        inserted += 1;
    }

    Ok((inserted, skipped))
}

/// Insert achievements that don't exist yet, keyed by title.
async fn seed_achievements(
    pool: &PgPool,
    achievements: &[SeedAchievement],
) -> Result<(u32, u32), sqlx::Error> {
    let mut inserted = 0;
    let mut skipped = 0;

    for achievement in achievements {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM achievements WHERE title = $1)",
        )
        .bind(&achievement.title)
        .fetch_one(pool)
        .await?;

        if exists {
            skipped += 1;
            continue;
        }

        sqlx::query(
            "INSERT INTO achievements (title, description, icon, cost, kind) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&achievement.title)
        .bind(&achievement.description)
        .bind(&achievement.icon)
        .bind(achievement.cost)
        .bind(&achievement.kind)
        .execute(pool)
        .await?;

        inserted += 1;
    }

    Ok((inserted, skipped))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
tasks:
  - title: Morning Run
    description: Run for 20 minutes
    points: 25
    category: cardio
    difficulty: easy
achievements:
  - title: Personal Trainer
    description: Prove your dedication
    icon: trophy
    cost: 50
    kind: job_title
";

    #[test]
    fn test_sample_catalog_parses_and_validates() {
        let catalog: SeedCatalog = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(catalog.tasks.len(), 1);
        assert_eq!(catalog.achievements.len(), 1);
        // min_level defaults to 1
        assert_eq!(catalog.tasks.first().unwrap().min_level, 1);
        assert!(validate_catalog(&catalog).is_empty());
    }

    #[test]
    fn test_validation_catches_bad_rows() {
        let bad = r"
tasks:
  - title: Bad Task
    description: Negative reward
    points: -5
    category: juggling
    difficulty: easy
    min_level: 9
achievements:
  - title: Bad Achievement
    description: Unknown kind
    cost: 10
    kind: crown
";
        let catalog: SeedCatalog = serde_yaml::from_str(bad).unwrap();
        let errors = validate_catalog(&catalog);
        // negative points, unknown category, out-of-range min_level, unknown kind
        assert_eq!(errors.len(), 4);
    }
}
