//! Challenge catalog persistence

use gdg_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::models::{Category, Challenge};

fn row_to_challenge(row: &sqlx::sqlite::SqliteRow) -> Result<Challenge> {
    let id: String = row.get("id");
    let category: String = row.get("category");
    let created_at: String = row.get("created_at");

    Ok(Challenge {
        id: super::parse_uuid(&id)?,
        title: row.get("title"),
        description: row.get("description"),
        category: Category::parse(&category)
            .ok_or_else(|| Error::Internal(format!("Invalid category '{category}'")))?,
        points: row.get("points"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        verification_prompt: row.get("verification_prompt"),
        is_active: row.get::<i64, _>("is_active") != 0,
        created_at: super::parse_timestamp(&created_at)?,
    })
}

/// Load challenge by id
pub async fn get(pool: &SqlitePool, challenge_id: Uuid) -> Result<Option<Challenge>> {
    let row = sqlx::query("SELECT * FROM challenges WHERE id = ?")
        .bind(challenge_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_challenge).transpose()
}

/// Active challenges, optionally filtered by category
pub async fn list_active(pool: &SqlitePool, category: Option<Category>) -> Result<Vec<Challenge>> {
    let rows = match category {
        Some(category) => {
            sqlx::query("SELECT * FROM challenges WHERE is_active = 1 AND category = ?")
                .bind(category.as_str())
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query("SELECT * FROM challenges WHERE is_active = 1")
                .fetch_all(pool)
                .await?
        }
    };

    rows.iter().map(row_to_challenge).collect()
}

/// Insert a challenge
pub async fn insert(pool: &SqlitePool, challenge: &Challenge) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO challenges (
            id, title, description, category, points,
            latitude, longitude, verification_prompt, is_active, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(challenge.id.to_string())
    .bind(&challenge.title)
    .bind(&challenge.description)
    .bind(challenge.category.as_str())
    .bind(challenge.points)
    .bind(challenge.latitude)
    .bind(challenge.longitude)
    .bind(&challenge.verification_prompt)
    .bind(challenge.is_active as i64)
    .bind(challenge.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Number of verified completions for a challenge
pub async fn completion_count(pool: &SqlitePool, challenge_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM submissions WHERE challenge_id = ? AND status = 'verified'",
    )
    .bind(challenge_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Create the default catalog when the table is empty
pub async fn seed_defaults(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM challenges")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Ok(());
    }

    let defaults = [
        (
            "Recycling Selfie",
            "Take a selfie while throwing trash in a recycling bin near this park.",
            Category::Recycling,
            10,
            40.7831,
            -73.9712,
            "Is this person taking a selfie while recycling or near a recycling bin?",
        ),
        (
            "Support Local Women-Led Business",
            "Find a local women-led business and write a positive review.",
            Category::Community,
            15,
            40.7589,
            -73.9851,
            "Does this image show someone at or near a local business?",
        ),
        (
            "Climate Awareness Mural",
            "Visit a mural related to climate awareness and share its story.",
            Category::Environment,
            20,
            40.7505,
            -73.9934,
            "Does this image show a climate or environmental awareness mural or artwork?",
        ),
        (
            "Community Garden Volunteer",
            "Help at a community garden and document your contribution.",
            Category::Environment,
            25,
            40.7614,
            -73.9776,
            "Does this image show someone working in or helping with a community garden?",
        ),
        (
            "Public Transport Check-in",
            "Use public transportation and share your eco-friendly choice.",
            Category::Transport,
            8,
            40.7527,
            -73.9772,
            "Does this image show someone using public transportation (bus, subway, train)?",
        ),
    ];

    for (title, description, category, points, latitude, longitude, prompt) in defaults {
        let challenge = Challenge {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            category,
            points,
            latitude,
            longitude,
            verification_prompt: prompt.to_string(),
            is_active: true,
            created_at: chrono::Utc::now(),
        };
        insert(pool, &challenge).await?;
    }

    info!("Default challenges created");

    Ok(())
}
