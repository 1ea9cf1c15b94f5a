//! Achievement persistence

use gdg_common::Result;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::models::Achievement;

fn row_to_achievement(row: &sqlx::sqlite::SqliteRow) -> Result<Achievement> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let earned_at: String = row.get("earned_at");

    Ok(Achievement {
        id: super::parse_uuid(&id)?,
        user_id: super::parse_uuid(&user_id)?,
        title: row.get("title"),
        description: row.get("description"),
        badge_icon: row.get("badge_icon"),
        earned_at: super::parse_timestamp(&earned_at)?,
    })
}

/// True iff the user already holds an achievement with this title
pub async fn exists_tx(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: Uuid,
    title: &str,
) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM achievements WHERE user_id = ? AND title = ?")
            .bind(user_id.to_string())
            .bind(title)
            .fetch_one(&mut **tx)
            .await?;

    Ok(count > 0)
}

/// Insert an achievement inside a transaction
pub async fn insert_tx(tx: &mut Transaction<'_, Sqlite>, achievement: &Achievement) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO achievements (id, user_id, title, description, badge_icon, earned_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(achievement.id.to_string())
    .bind(achievement.user_id.to_string())
    .bind(&achievement.title)
    .bind(&achievement.description)
    .bind(&achievement.badge_icon)
    .bind(achievement.earned_at.to_rfc3339())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// All achievements for a user, newest first
pub async fn list_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Achievement>> {
    let rows = sqlx::query(
        "SELECT * FROM achievements WHERE user_id = ? ORDER BY earned_at DESC",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_achievement).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users;

    async fn setup_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        gdg_common::db::create_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_insert_exists_list() {
        let pool = setup_pool().await;
        let user = users::create_anonymous(&pool).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        assert!(!exists_tx(&mut tx, user.id, "First Steps").await.unwrap());

        let achievement = Achievement::new(
            user.id,
            "First Steps",
            "Completed your first challenge!",
            "fas fa-baby",
        );
        insert_tx(&mut tx, &achievement).await.unwrap();

        assert!(exists_tx(&mut tx, user.id, "First Steps").await.unwrap());
        tx.commit().await.unwrap();

        let listed = list_for_user(&pool, user.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "First Steps");
        assert_eq!(listed[0].badge_icon, "fas fa-baby");
    }
}
