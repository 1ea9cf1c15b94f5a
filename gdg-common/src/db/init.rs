//! Database initialization
//!
//! Opens (or creates) the SQLite database under the root folder and creates
//! the schema on first run. Schema creation is idempotent, so every binary
//! can run it unconditionally at startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times)
///
/// Exposed separately so tests can build the schema on in-memory pools.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_challenges_table(pool).await?;
    create_submissions_table(pool).await?;
    create_achievements_table(pool).await?;

    info!("Database tables initialized (users, challenges, submissions, achievements)");

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            email TEXT UNIQUE NOT NULL,
            total_points INTEGER NOT NULL DEFAULT 0,
            level TEXT NOT NULL DEFAULT 'Bronze',
            session_token TEXT UNIQUE NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_challenges_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS challenges (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            points INTEGER NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            verification_prompt TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_submissions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            challenge_id TEXT NOT NULL REFERENCES challenges(id),
            image_name TEXT NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            raw_result TEXT,
            points_awarded INTEGER NOT NULL DEFAULT 0,
            submitted_at TEXT NOT NULL,
            verified_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_submissions_user_challenge
        ON submissions (user_id, challenge_id, status)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_achievements_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS achievements (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            badge_icon TEXT NOT NULL,
            earned_at TEXT NOT NULL,
            UNIQUE (user_id, title)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_tables_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        create_tables(&pool).await.expect("First creation failed");
        create_tables(&pool).await.expect("Second creation failed");

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
             ('users', 'challenges', 'submissions', 'achievements')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_init_database_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("gooddeedgo.db");

        let pool = init_database(&db_path).await.expect("init failed");

        assert!(db_path.exists());

        sqlx::query("INSERT INTO users (id, username, email, session_token, created_at) \
                     VALUES ('u1', 'user_1', 'user_1@gooddeedgo.app', 'tok-1', CURRENT_TIMESTAMP)")
            .execute(&pool)
            .await
            .expect("insert failed");
    }

    #[tokio::test]
    async fn test_achievement_unique_per_user_title() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_tables(&pool).await.unwrap();

        sqlx::query("INSERT INTO users (id, username, email, session_token, created_at) \
                     VALUES ('u1', 'user_1', 'user_1@gooddeedgo.app', 'tok-1', CURRENT_TIMESTAMP)")
            .execute(&pool)
            .await
            .unwrap();

        let insert = "INSERT INTO achievements (id, user_id, title, description, badge_icon, earned_at) \
                      VALUES (?, 'u1', 'First Steps', 'Completed your first challenge!', 'fas fa-baby', CURRENT_TIMESTAMP)";

        sqlx::query(insert).bind("a1").execute(&pool).await.unwrap();
        let duplicate = sqlx::query(insert).bind("a2").execute(&pool).await;

        assert!(duplicate.is_err(), "duplicate (user, title) should violate UNIQUE");
    }
}
