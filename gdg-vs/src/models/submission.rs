//! Submission model and status lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Submission status
///
/// `pending` exists only between construction and resolution; a submission
/// row is persisted only once it reaches a terminal state, and is never
/// re-verified afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Verified,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Verified => "verified",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SubmissionStatus::Pending),
            "verified" => Some(SubmissionStatus::Verified),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }

    /// Terminal states cannot transition further
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Verified | SubmissionStatus::Rejected)
    }
}

/// One user's attempt at a challenge, carrying photographic and location evidence
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub challenge_id: Uuid,
    pub image_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: SubmissionStatus,
    pub raw_result: Option<String>,
    pub points_awarded: i64,
    pub submitted_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl Submission {
    /// Construct a new pending submission
    pub fn new(
        user_id: Uuid,
        challenge_id: Uuid,
        image_name: String,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            challenge_id,
            image_name,
            latitude,
            longitude,
            status: SubmissionStatus::Pending,
            raw_result: None,
            points_awarded: 0,
            submitted_at: Utc::now(),
            verified_at: None,
        }
    }

    /// Resolve to verified with the challenge's point value
    pub fn resolve_verified(&mut self, raw_result: String, points: i64) {
        self.status = SubmissionStatus::Verified;
        self.raw_result = Some(raw_result);
        self.points_awarded = points;
        self.verified_at = Some(Utc::now());
    }

    /// Resolve to rejected, recording the raw output or failure message
    pub fn resolve_rejected(&mut self, raw_result: String) {
        self.status = SubmissionStatus::Rejected;
        self.raw_result = Some(raw_result);
        self.points_awarded = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::Verified,
            SubmissionStatus::Rejected,
        ] {
            assert_eq!(SubmissionStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SubmissionStatus::Pending.is_terminal());
        assert!(SubmissionStatus::Verified.is_terminal());
        assert!(SubmissionStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_resolve_verified_sets_points_and_timestamp() {
        let mut submission = Submission::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "img.jpg".to_string(),
            40.0,
            -73.0,
        );
        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert!(submission.verified_at.is_none());

        submission.resolve_verified("Yes, this is valid".to_string(), 10);

        assert_eq!(submission.status, SubmissionStatus::Verified);
        assert_eq!(submission.points_awarded, 10);
        assert!(submission.verified_at.is_some());
    }

    #[test]
    fn test_resolve_rejected_awards_nothing() {
        let mut submission = Submission::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "img.jpg".to_string(),
            40.0,
            -73.0,
        );
        submission.resolve_rejected("not_a_deed".to_string());

        assert_eq!(submission.status, SubmissionStatus::Rejected);
        assert_eq!(submission.points_awarded, 0);
        assert!(submission.verified_at.is_none());
    }
}
