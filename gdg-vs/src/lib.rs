//! gdg-vs library interface
//!
//! Exposes the application state, router, and service components for the
//! deployment binaries and for integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::blob_store::BlobStore;
use crate::services::pipeline::SubmissionPipeline;
use crate::services::verify::VerificationBackend;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Uploaded-image storage
    pub blob_store: Arc<BlobStore>,
    /// The deployment's verification backend
    pub backend: Arc<dyn VerificationBackend>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        blob_store: Arc<BlobStore>,
        backend: Arc<dyn VerificationBackend>,
    ) -> Self {
        Self {
            db,
            blob_store,
            backend,
            startup_time: Utc::now(),
        }
    }

    /// Submission pipeline over this state's pool, store, and backend
    pub fn pipeline(&self) -> SubmissionPipeline {
        SubmissionPipeline::new(
            self.db.clone(),
            self.blob_store.clone(),
            self.backend.clone(),
        )
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health::health_routes())
        .merge(api::challenges::challenge_routes())
        .merge(api::submissions::submission_routes())
        .merge(api::profile::profile_routes())
        .merge(api::leaderboard::leaderboard_routes())
        // One MiB of headroom over the photo limit for multipart framing
        .layer(DefaultBodyLimit::max(
            services::preprocess::MAX_UPLOAD_BYTES + 1024 * 1024,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
