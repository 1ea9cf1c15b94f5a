//! HTTP API handlers
//!
//! JSON REST surface over the submission pipeline and catalog. Session
//! context is explicit: handlers that act on behalf of a user read the
//! X-Session-Token header and hand the resolved user to the pipeline.

pub mod challenges;
pub mod health;
pub mod leaderboard;
pub mod profile;
pub mod submissions;

use axum::http::HeaderMap;

use crate::db;
use crate::error::ApiResult;
use crate::models::User;
use crate::AppState;

/// Session token request header
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Resolve the session user from the request headers, creating an
/// anonymous user when the token is absent or unknown
pub(crate) async fn session_user(state: &AppState, headers: &HeaderMap) -> ApiResult<User> {
    let token = headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    Ok(db::users::find_or_create_session_user(&state.db, token).await?)
}
