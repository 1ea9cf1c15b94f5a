//! Profile API handler

use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use serde::Serialize;

use crate::db;
use crate::error::ApiResult;
use crate::models::{Achievement, Submission, User};
use crate::AppState;

/// GET /api/profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    /// Submissions, newest first
    pub submissions: Vec<Submission>,
    /// Achievements, newest first
    pub achievements: Vec<Achievement>,
    pub session_token: String,
}

/// GET /api/profile
///
/// The session user's points, level, submissions, and achievements.
pub async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ProfileResponse>> {
    let user = super::session_user(&state, &headers).await?;

    let submissions = db::submissions::list_for_user(&state.db, user.id).await?;
    let achievements = db::achievements::list_for_user(&state.db, user.id).await?;
    let session_token = user.session_token.clone();

    Ok(Json(ProfileResponse {
        user,
        submissions,
        achievements,
        session_token,
    }))
}

/// Build profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/api/profile", get(profile))
}
