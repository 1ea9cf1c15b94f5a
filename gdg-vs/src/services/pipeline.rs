//! Submission state machine
//!
//! Orchestrates one submission through the gate-chain: file validation,
//! preprocessing, geofence check, backend inference, verdict, and the
//! final state mutation. Every user-facing failure is a structured
//! outcome, never an error that aborts the request; verified side effects
//! commit atomically in one transaction.

use gdg_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::models::{Challenge, Submission, User};
use crate::services::blob_store::BlobStore;
use crate::services::geofence::{self, Coordinates, DEFAULT_MAX_DISTANCE_KM};
use crate::services::preprocess::{self, MAX_UPLOAD_BYTES};
use crate::services::verify::{ImagePayload, VerificationBackend};

/// One inbound submission: challenge, coordinates, photo
#[derive(Debug)]
pub struct SubmissionRequest {
    pub challenge_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    /// Declared filename of the photo part; None when no part was sent
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// Structured result of a submission attempt
#[derive(Debug, Clone, serde::Serialize)]
pub struct SubmissionOutcome {
    pub success: bool,
    pub message: String,
    pub points_awarded: i64,
    pub submission_id: Option<Uuid>,
    /// Titles of achievements earned by this submission
    pub new_achievements: Vec<String>,
}

impl SubmissionOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            points_awarded: 0,
            submission_id: None,
            new_achievements: Vec::new(),
        }
    }
}

/// The submission pipeline, shared by every deployment variant
pub struct SubmissionPipeline {
    db: SqlitePool,
    blob_store: Arc<BlobStore>,
    backend: Arc<dyn VerificationBackend>,
}

impl SubmissionPipeline {
    pub fn new(
        db: SqlitePool,
        blob_store: Arc<BlobStore>,
        backend: Arc<dyn VerificationBackend>,
    ) -> Self {
        Self {
            db,
            blob_store,
            backend,
        }
    }

    /// Run one submission through the full gate-chain
    pub async fn submit(&self, user: &User, request: SubmissionRequest) -> Result<SubmissionOutcome> {
        let challenge = db::challenges::get(&self.db, request.challenge_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Challenge {}", request.challenge_id)))?;

        // Gate 1: idempotent short-circuit, no state change
        if db::submissions::has_verified(&self.db, user.id, challenge.id).await? {
            return Ok(SubmissionOutcome::failure(
                "You have already completed this challenge!",
            ));
        }

        // Gate 2: photo presence, type, and size, before persisting anything
        let Some(filename) = request.filename.as_deref() else {
            return Ok(SubmissionOutcome::failure("No photo uploaded!"));
        };
        if filename.is_empty() || request.data.is_empty() {
            return Ok(SubmissionOutcome::failure("No photo selected!"));
        }
        if !preprocess::allowed_file(filename) {
            return Ok(SubmissionOutcome::failure(
                "Invalid file type. Please upload a valid image.",
            ));
        }
        if request.data.len() > MAX_UPLOAD_BYTES {
            return Ok(SubmissionOutcome::failure(
                "Photo is too large. Maximum size is 16 MB.",
            ));
        }

        // Gate 3: preprocess and persist the image, construct pending record
        let data = preprocess::preprocess(request.data, filename);
        let image_name = self.blob_store.store(filename, &data)?;
        let mut submission = Submission::new(
            user.id,
            challenge.id,
            image_name,
            request.latitude,
            request.longitude,
        );

        // Gate 4: geofence; failure leaves no record and no stored image
        let submitter = Coordinates {
            latitude: request.latitude,
            longitude: request.longitude,
        };
        if !geofence::within_radius(challenge.location(), submitter, DEFAULT_MAX_DISTANCE_KM) {
            let distance = geofence::haversine_km(challenge.location(), submitter);
            info!(
                user_id = %user.id,
                challenge_id = %challenge.id,
                distance_km = distance,
                "Submission rejected by geofence"
            );
            self.blob_store.delete(&submission.image_name)?;
            return Ok(SubmissionOutcome::failure(
                "You are too far from the challenge location!",
            ));
        }

        // Gate 5: backend inference plus verdict; any backend failure is a
        // rejection outcome with the failure reason as the raw result
        let payload = ImagePayload {
            mime_type: preprocess::sniff_mime_type(&data).to_string(),
            data,
        };
        let (raw_result, accepted) = match self
            .backend
            .classify(&payload, &challenge.verification_prompt)
            .await
        {
            Ok(outcome) => (outcome.raw, outcome.accepted),
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    error = %e,
                    "Verification backend failed"
                );
                (format!("Verification failed: {e}"), false)
            }
        };

        if accepted {
            self.finalize_verified(user, &challenge, submission, raw_result)
                .await
        } else {
            submission.resolve_rejected(raw_result);
            db::submissions::insert(&self.db, &submission).await?;
            info!(
                submission_id = %submission.id,
                user_id = %user.id,
                challenge_id = %challenge.id,
                "Submission rejected"
            );
            Ok(SubmissionOutcome {
                success: false,
                message: "Your submission could not be verified. Please try again with a clearer photo."
                    .to_string(),
                points_awarded: 0,
                submission_id: Some(submission.id),
                new_achievements: Vec::new(),
            })
        }
    }

    /// Commit the verified transition atomically: submission row, point
    /// award, level recompute, and achievement evaluation
    async fn finalize_verified(
        &self,
        user: &User,
        challenge: &Challenge,
        mut submission: Submission,
        raw_result: String,
    ) -> Result<SubmissionOutcome> {
        let mut tx = self.db.begin().await?;

        // Re-check the one-verified-submission invariant inside the
        // transaction; two concurrent submissions can both pass gate 1
        if db::submissions::has_verified_tx(&mut tx, user.id, challenge.id).await? {
            drop(tx);
            self.blob_store.delete(&submission.image_name)?;
            return Ok(SubmissionOutcome::failure(
                "You have already completed this challenge!",
            ));
        }

        submission.resolve_verified(raw_result, challenge.points);
        db::submissions::insert_tx(&mut tx, &submission).await?;

        let (new_total, new_level) = db::users::add_points(&mut tx, user.id, challenge.points).await?;
        let awarded = crate::services::achievements::evaluate(&mut tx, user.id, new_total).await?;

        tx.commit().await?;

        info!(
            submission_id = %submission.id,
            user_id = %user.id,
            challenge_id = %challenge.id,
            points = challenge.points,
            total_points = new_total,
            level = new_level.as_str(),
            "Submission verified"
        );

        Ok(SubmissionOutcome {
            success: true,
            message: format!("Challenge completed! You earned {} points!", challenge.points),
            points_awarded: challenge.points,
            submission_id: Some(submission.id),
            new_achievements: awarded.into_iter().map(|a| a.title).collect(),
        })
    }
}
