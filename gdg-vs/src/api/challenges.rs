//! Challenge catalog API handlers

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{Category, Challenge};
use crate::AppState;

/// GET /api/challenges query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Category filter; "all" or absent lists every category
    pub category: Option<String>,
}

/// GET /api/challenges/nearby query parameters
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

/// A challenge plus its verified completion count
#[derive(Debug, Serialize)]
pub struct ChallengeView {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub completions: i64,
}

/// GET /api/challenges/:id response
#[derive(Debug, Serialize)]
pub struct ChallengeDetailResponse {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub completions: i64,
    /// Whether the session user already holds a verified submission
    pub completed: bool,
    pub session_token: String,
}

async fn with_completions(state: &AppState, challenges: Vec<Challenge>) -> ApiResult<Vec<ChallengeView>> {
    let mut views = Vec::with_capacity(challenges.len());
    for challenge in challenges {
        let completions = db::challenges::completion_count(&state.db, challenge.id).await?;
        views.push(ChallengeView {
            challenge,
            completions,
        });
    }
    Ok(views)
}

/// GET /api/challenges
///
/// Active challenges, optionally filtered by category.
pub async fn list_challenges(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ChallengeView>>> {
    let category = match query.category.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(
            Category::parse(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown category: {raw}")))?,
        ),
    };

    let challenges = db::challenges::list_active(&state.db, category).await?;
    Ok(Json(with_completions(&state, challenges).await?))
}

/// GET /api/challenges/nearby
///
/// Active challenges with coordinates and completion counts; distance
/// filtering happens client-side.
pub async fn nearby_challenges(
    State(state): State<AppState>,
    Query(_query): Query<NearbyQuery>,
) -> ApiResult<Json<Vec<ChallengeView>>> {
    let challenges = db::challenges::list_active(&state.db, None).await?;
    Ok(Json(with_completions(&state, challenges).await?))
}

/// GET /api/challenges/:id
///
/// Challenge detail plus the session user's completion flag.
pub async fn challenge_detail(
    State(state): State<AppState>,
    Path(challenge_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<ChallengeDetailResponse>> {
    let challenge = db::challenges::get(&state.db, challenge_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Challenge not found: {challenge_id}")))?;

    let user = super::session_user(&state, &headers).await?;
    let completed = db::submissions::has_verified(&state.db, user.id, challenge.id).await?;
    let completions = db::challenges::completion_count(&state.db, challenge.id).await?;

    Ok(Json(ChallengeDetailResponse {
        challenge,
        completions,
        completed,
        session_token: user.session_token,
    }))
}

/// Build challenge catalog routes
pub fn challenge_routes() -> Router<AppState> {
    Router::new()
        .route("/api/challenges", get(list_challenges))
        .route("/api/challenges/nearby", get(nearby_challenges))
        .route("/api/challenges/:id", get(challenge_detail))
}
