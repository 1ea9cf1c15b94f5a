//! User persistence and session binding
//!
//! Session context is explicit: handlers resolve the user from the request
//! session token, creating an anonymous user on first contact. The fresh
//! token travels back to the client in the response.

use gdg_common::{Error, Result};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::models::{Level, User};

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let id: String = row.get("id");
    let level: String = row.get("level");
    let created_at: String = row.get("created_at");

    Ok(User {
        id: super::parse_uuid(&id)?,
        username: row.get("username"),
        email: row.get("email"),
        total_points: row.get("total_points"),
        level: Level::parse(&level)
            .ok_or_else(|| Error::Internal(format!("Invalid level '{level}'")))?,
        session_token: row.get("session_token"),
        created_at: super::parse_timestamp(&created_at)?,
    })
}

/// Load user by id
pub async fn get(pool: &SqlitePool, user_id: Uuid) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_user).transpose()
}

/// Load user by session token
pub async fn find_by_session(pool: &SqlitePool, session_token: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE session_token = ?")
        .bind(session_token)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_user).transpose()
}

/// Create a new anonymous user with a fresh session token
pub async fn create_anonymous(pool: &SqlitePool) -> Result<User> {
    let id = Uuid::new_v4();
    let id_hex = id.simple().to_string();
    let username = format!("user_{}", &id_hex[..8]);
    let email = format!("{username}@gooddeedgo.app");
    let session_token = Uuid::new_v4().simple().to_string();
    let created_at = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, total_points, level, session_token, created_at)
        VALUES (?, ?, ?, 0, 'Bronze', ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(&username)
    .bind(&email)
    .bind(&session_token)
    .bind(created_at.to_rfc3339())
    .execute(pool)
    .await?;

    info!(username = %username, "Created new anonymous user");

    Ok(User {
        id,
        username,
        email,
        total_points: 0,
        level: Level::Bronze,
        session_token,
        created_at,
    })
}

/// Resolve the session user, creating an anonymous one when the token is
/// absent or unknown
pub async fn find_or_create_session_user(
    pool: &SqlitePool,
    session_token: Option<&str>,
) -> Result<User> {
    if let Some(token) = session_token {
        if let Some(user) = find_by_session(pool, token).await? {
            return Ok(user);
        }
    }
    create_anonymous(pool).await
}

/// Add points and recompute level as a single unit, inside a transaction
///
/// Returns the new total and level.
pub async fn add_points(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: Uuid,
    points: i64,
) -> Result<(i64, Level)> {
    let current: i64 = sqlx::query_scalar("SELECT total_points FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_one(&mut **tx)
        .await?;

    let new_total = current + points;
    let new_level = Level::from_points(new_total);

    sqlx::query("UPDATE users SET total_points = ?, level = ? WHERE id = ?")
        .bind(new_total)
        .bind(new_level.as_str())
        .bind(user_id.to_string())
        .execute(&mut **tx)
        .await?;

    Ok((new_total, new_level))
}

/// Top users by points, descending, excluding zero-point users
pub async fn top_users(pool: &SqlitePool, limit: i64) -> Result<Vec<User>> {
    let rows = sqlx::query(
        "SELECT * FROM users WHERE total_points > 0 ORDER BY total_points DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_user).collect()
}
