//! Submission intake handler
//!
//! Multipart form: `photo` (file part), `user_lat`, `user_lng` (text
//! parts). Coordinates default to 0.0 when absent, preserving the source
//! behavior; clients should always send explicit coordinates.

use axum::{
    extract::{Multipart, Path, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::pipeline::{SubmissionOutcome, SubmissionRequest};
use crate::AppState;

/// POST /api/challenges/:id/submissions response
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    #[serde(flatten)]
    pub outcome: SubmissionOutcome,
    /// Session token for the client to persist
    pub session_token: String,
}

/// POST /api/challenges/:id/submissions
///
/// Runs the full verification pipeline and returns the structured
/// outcome. User errors (bad file, geofence, unverified photo) are
/// outcomes with success = false, not HTTP errors.
pub async fn submit_challenge(
    State(state): State<AppState>,
    Path(challenge_id): Path<Uuid>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<SubmissionResponse>> {
    let user = super::session_user(&state, &headers).await?;

    let mut latitude = 0.0_f64;
    let mut longitude = 0.0_f64;
    let mut filename: Option<String> = None;
    let mut data: Vec<u8> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("photo") => {
                filename = Some(field.file_name().unwrap_or_default().to_string());
                data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable photo part: {e}")))?
                    .to_vec();
            }
            Some("user_lat") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable user_lat: {e}")))?;
                latitude = text.trim().parse().unwrap_or(0.0);
            }
            Some("user_lng") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Unreadable user_lng: {e}")))?;
                longitude = text.trim().parse().unwrap_or(0.0);
            }
            _ => {}
        }
    }

    let request = SubmissionRequest {
        challenge_id,
        latitude,
        longitude,
        filename,
        data,
    };

    let outcome = state.pipeline().submit(&user, request).await?;

    Ok(Json(SubmissionResponse {
        outcome,
        session_token: user.session_token,
    }))
}

/// Build submission routes
pub fn submission_routes() -> Router<AppState> {
    Router::new().route("/api/challenges/:id/submissions", post(submit_challenge))
}
