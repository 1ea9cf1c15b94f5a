//! Leaderboard API handler

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db;
use crate::error::ApiResult;
use crate::models::Level;
use crate::AppState;

/// Number of users shown on the leaderboard
const LEADERBOARD_SIZE: i64 = 20;

/// One leaderboard row
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub total_points: i64,
    pub level: Level,
}

/// GET /api/leaderboard
///
/// Top users by total points, descending, excluding zero-point users.
pub async fn leaderboard(State(state): State<AppState>) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let top = db::users::top_users(&state.db, LEADERBOARD_SIZE).await?;

    let entries = top
        .into_iter()
        .enumerate()
        .map(|(i, user)| LeaderboardEntry {
            rank: i + 1,
            username: user.username,
            total_points: user.total_points,
            level: user.level,
        })
        .collect();

    Ok(Json(entries))
}

/// Build leaderboard routes
pub fn leaderboard_routes() -> Router<AppState> {
    Router::new().route("/api/leaderboard", get(leaderboard))
}
