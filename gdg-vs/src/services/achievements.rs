//! Achievement rule evaluation
//!
//! A declarative table of (predicate, title, description, badge) evaluated
//! uniformly after every verified transition. Each rule is idempotent per
//! (user, title); multiple rules may fire in one evaluation.

use gdg_common::Result;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

use crate::db;
use crate::models::{Achievement, Category};

/// User statistics the rule predicates are evaluated against
#[derive(Debug, Clone, Copy)]
pub struct UserStats {
    /// Point total after the current award
    pub total_points: i64,
    /// Verified submissions in the recycling category, including the
    /// current one
    pub recycling_verified: i64,
}

/// One row of the achievement rule table
pub struct AchievementRule {
    pub title: &'static str,
    pub description: &'static str,
    pub badge_icon: &'static str,
    pub predicate: fn(&UserStats) -> bool,
}

/// The full rule table, evaluated in order
pub const RULES: &[AchievementRule] = &[
    AchievementRule {
        title: "First Steps",
        description: "Completed your first challenge!",
        badge_icon: "fas fa-baby",
        predicate: |stats| stats.total_points >= 10,
    },
    AchievementRule {
        title: "Getting Started",
        description: "Earned 50 points!",
        badge_icon: "fas fa-star",
        predicate: |stats| stats.total_points >= 50,
    },
    AchievementRule {
        title: "Century Club",
        description: "Earned 100 points!",
        badge_icon: "fas fa-trophy",
        predicate: |stats| stats.total_points >= 100,
    },
    AchievementRule {
        title: "Recycling Hero",
        description: "Completed 3 recycling challenges!",
        badge_icon: "fas fa-recycle",
        predicate: |stats| stats.recycling_verified >= 3,
    },
];

/// Evaluate every rule for a user and insert the newly earned badges
///
/// Runs inside the verified-transition transaction so awards commit
/// atomically with the submission and point update. Returns the freshly
/// awarded achievements.
pub async fn evaluate(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: Uuid,
    total_points: i64,
) -> Result<Vec<Achievement>> {
    let recycling_verified =
        db::submissions::count_verified_in_category_tx(tx, user_id, Category::Recycling).await?;

    let stats = UserStats {
        total_points,
        recycling_verified,
    };

    let mut awarded = Vec::new();
    for rule in RULES {
        if !(rule.predicate)(&stats) {
            continue;
        }
        if db::achievements::exists_tx(tx, user_id, rule.title).await? {
            continue;
        }
        let achievement = Achievement::new(user_id, rule.title, rule.description, rule.badge_icon);
        db::achievements::insert_tx(tx, &achievement).await?;
        tracing::info!(user_id = %user_id, title = rule.title, "Achievement awarded");
        awarded.push(achievement);
    }

    Ok(awarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users;
    use sqlx::SqlitePool;

    fn stats(total_points: i64, recycling_verified: i64) -> UserStats {
        UserStats {
            total_points,
            recycling_verified,
        }
    }

    #[test]
    fn test_point_milestone_predicates() {
        let by_title = |title: &str| RULES.iter().find(|r| r.title == title).unwrap();

        let first_steps = by_title("First Steps");
        assert!(!(first_steps.predicate)(&stats(9, 0)));
        assert!((first_steps.predicate)(&stats(10, 0)));

        let getting_started = by_title("Getting Started");
        assert!(!(getting_started.predicate)(&stats(49, 0)));
        assert!((getting_started.predicate)(&stats(50, 0)));

        let century_club = by_title("Century Club");
        assert!(!(century_club.predicate)(&stats(99, 0)));
        assert!((century_club.predicate)(&stats(100, 0)));
    }

    #[test]
    fn test_recycling_hero_predicate() {
        let rule = RULES.iter().find(|r| r.title == "Recycling Hero").unwrap();
        assert!(!(rule.predicate)(&stats(1000, 2)));
        assert!((rule.predicate)(&stats(0, 3)));
    }

    async fn setup_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        gdg_common::db::create_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_evaluate_awards_multiple_rules_at_once() {
        let pool = setup_pool().await;
        let user = users::create_anonymous(&pool).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let awarded = evaluate(&mut tx, user.id, 120).await.unwrap();
        tx.commit().await.unwrap();

        let titles: Vec<&str> = awarded.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["First Steps", "Getting Started", "Century Club"]);
    }

    #[tokio::test]
    async fn test_evaluate_is_idempotent() {
        let pool = setup_pool().await;
        let user = users::create_anonymous(&pool).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let first = evaluate(&mut tx, user.id, 10).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].title, "First Steps");

        // Re-running for the same user awards nothing new
        let mut tx = pool.begin().await.unwrap();
        let second = evaluate(&mut tx, user.id, 10).await.unwrap();
        tx.commit().await.unwrap();
        assert!(second.is_empty());

        let listed = crate::db::achievements::list_for_user(&pool, user.id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_below_thresholds_awards_nothing() {
        let pool = setup_pool().await;
        let user = users::create_anonymous(&pool).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let awarded = evaluate(&mut tx, user.id, 8).await.unwrap();
        tx.commit().await.unwrap();

        assert!(awarded.is_empty());
    }
}
