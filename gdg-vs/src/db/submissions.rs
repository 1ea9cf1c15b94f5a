//! Submission persistence
//!
//! Submissions are written only in a terminal state; the pipeline never
//! updates a row after insertion, which keeps the write-once-to-terminal
//! invariant at the storage layer.

use gdg_common::{Error, Result};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::models::{Category, Submission, SubmissionStatus};

fn row_to_submission(row: &sqlx::sqlite::SqliteRow) -> Result<Submission> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let challenge_id: String = row.get("challenge_id");
    let status: String = row.get("status");
    let submitted_at: String = row.get("submitted_at");
    let verified_at: Option<String> = row.get("verified_at");

    Ok(Submission {
        id: super::parse_uuid(&id)?,
        user_id: super::parse_uuid(&user_id)?,
        challenge_id: super::parse_uuid(&challenge_id)?,
        image_name: row.get("image_name"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        status: SubmissionStatus::parse(&status)
            .ok_or_else(|| Error::Internal(format!("Invalid status '{status}'")))?,
        raw_result: row.get("raw_result"),
        points_awarded: row.get("points_awarded"),
        submitted_at: super::parse_timestamp(&submitted_at)?,
        verified_at: verified_at
            .as_deref()
            .map(super::parse_timestamp)
            .transpose()?,
    })
}

/// True iff the user already holds a verified submission for the challenge
pub async fn has_verified(pool: &SqlitePool, user_id: Uuid, challenge_id: Uuid) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM submissions \
         WHERE user_id = ? AND challenge_id = ? AND status = 'verified'",
    )
    .bind(user_id.to_string())
    .bind(challenge_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Transaction-scoped variant of `has_verified`, used to re-check the
/// one-verified-submission invariant immediately before committing
pub async fn has_verified_tx(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: Uuid,
    challenge_id: Uuid,
) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM submissions \
         WHERE user_id = ? AND challenge_id = ? AND status = 'verified'",
    )
    .bind(user_id.to_string())
    .bind(challenge_id.to_string())
    .fetch_one(&mut **tx)
    .await?;

    Ok(count > 0)
}

/// Insert a terminal submission inside a transaction
pub async fn insert_tx(tx: &mut Transaction<'_, Sqlite>, submission: &Submission) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO submissions (
            id, user_id, challenge_id, image_name, latitude, longitude,
            status, raw_result, points_awarded, submitted_at, verified_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(submission.id.to_string())
    .bind(submission.user_id.to_string())
    .bind(submission.challenge_id.to_string())
    .bind(&submission.image_name)
    .bind(submission.latitude)
    .bind(submission.longitude)
    .bind(submission.status.as_str())
    .bind(&submission.raw_result)
    .bind(submission.points_awarded)
    .bind(submission.submitted_at.to_rfc3339())
    .bind(submission.verified_at.map(|dt| dt.to_rfc3339()))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Insert a terminal submission outside a transaction (rejection path)
pub async fn insert(pool: &SqlitePool, submission: &Submission) -> Result<()> {
    let mut tx = pool.begin().await?;
    insert_tx(&mut tx, submission).await?;
    tx.commit().await?;
    Ok(())
}

/// All submissions for a user, newest first
pub async fn list_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Submission>> {
    let rows = sqlx::query(
        "SELECT * FROM submissions WHERE user_id = ? ORDER BY submitted_at DESC",
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_submission).collect()
}

/// Verified submissions a user holds in one challenge category
pub async fn count_verified_in_category_tx(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: Uuid,
    category: Category,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM submissions s
        JOIN challenges c ON c.id = s.challenge_id
        WHERE s.user_id = ? AND s.status = 'verified' AND c.category = ?
        "#,
    )
    .bind(user_id.to_string())
    .bind(category.as_str())
    .fetch_one(&mut **tx)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{challenges, users};

    async fn setup_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        gdg_common::db::create_tables(&pool).await.unwrap();
        challenges::seed_defaults(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_insert_and_list_roundtrip() {
        let pool = setup_pool().await;
        let user = users::create_anonymous(&pool).await.unwrap();
        let challenge = challenges::list_active(&pool, None).await.unwrap().remove(0);

        let mut submission = Submission::new(
            user.id,
            challenge.id,
            "abc_deed.jpg".to_string(),
            40.7831,
            -73.9712,
        );
        submission.resolve_verified("Yes, valid".to_string(), challenge.points);
        insert(&pool, &submission).await.unwrap();

        let listed = list_for_user(&pool, user.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, SubmissionStatus::Verified);
        assert_eq!(listed[0].points_awarded, challenge.points);
        assert_eq!(listed[0].raw_result.as_deref(), Some("Yes, valid"));
        assert!(listed[0].verified_at.is_some());
    }

    #[tokio::test]
    async fn test_has_verified() {
        let pool = setup_pool().await;
        let user = users::create_anonymous(&pool).await.unwrap();
        let challenge = challenges::list_active(&pool, None).await.unwrap().remove(0);

        assert!(!has_verified(&pool, user.id, challenge.id).await.unwrap());

        let mut rejected = Submission::new(
            user.id,
            challenge.id,
            "a.jpg".to_string(),
            0.0,
            0.0,
        );
        rejected.resolve_rejected("not_a_deed".to_string());
        insert(&pool, &rejected).await.unwrap();

        // A rejected submission does not count as completion
        assert!(!has_verified(&pool, user.id, challenge.id).await.unwrap());

        let mut verified = Submission::new(
            user.id,
            challenge.id,
            "b.jpg".to_string(),
            0.0,
            0.0,
        );
        verified.resolve_verified("Yes".to_string(), challenge.points);
        insert(&pool, &verified).await.unwrap();

        assert!(has_verified(&pool, user.id, challenge.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_count_verified_in_category() {
        let pool = setup_pool().await;
        let user = users::create_anonymous(&pool).await.unwrap();
        let recycling = challenges::list_active(&pool, Some(Category::Recycling))
            .await
            .unwrap()
            .remove(0);
        let transport = challenges::list_active(&pool, Some(Category::Transport))
            .await
            .unwrap()
            .remove(0);

        for challenge in [&recycling, &transport] {
            let mut submission = Submission::new(
                user.id,
                challenge.id,
                "img.jpg".to_string(),
                0.0,
                0.0,
            );
            submission.resolve_verified("Yes".to_string(), challenge.points);
            insert(&pool, &submission).await.unwrap();
        }

        let mut tx = pool.begin().await.unwrap();
        let count = count_verified_in_category_tx(&mut tx, user.id, Category::Recycling)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_completion_count_counts_verified_only() {
        let pool = setup_pool().await;
        let user_a = users::create_anonymous(&pool).await.unwrap();
        let user_b = users::create_anonymous(&pool).await.unwrap();
        let challenge = challenges::list_active(&pool, None).await.unwrap().remove(0);

        let mut verified = Submission::new(
            user_a.id,
            challenge.id,
            "a.jpg".to_string(),
            0.0,
            0.0,
        );
        verified.resolve_verified("Yes".to_string(), challenge.points);
        insert(&pool, &verified).await.unwrap();

        let mut rejected = Submission::new(
            user_b.id,
            challenge.id,
            "b.jpg".to_string(),
            0.0,
            0.0,
        );
        rejected.resolve_rejected("no".to_string());
        insert(&pool, &rejected).await.unwrap();

        let count = challenges::completion_count(&pool, challenge.id).await.unwrap();
        assert_eq!(count, 1);
    }
}
