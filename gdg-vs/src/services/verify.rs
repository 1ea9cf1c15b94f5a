//! Verification backend contract
//!
//! Both classifier variants implement one trait: image in, outcome out.
//! The active backend is chosen at deployment time by packaging the
//! matching binary; nothing selects a backend per request.

use thiserror::Error;

/// Verification client errors
///
/// Every variant is mapped to a rejected submission by the pipeline, with
/// the failure message recorded as the raw result. None of these crash a
/// request.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Endpoint unreachable, connection dropped, or request timed out
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Endpoint returned a non-success status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the response, or to prepare the image for inference
    #[error("Inference error: {0}")]
    Inference(String),
}

impl VerifyError {
    /// Classify a reqwest failure: timeouts and connection problems are
    /// unavailability, everything else an inference error
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            VerifyError::Unavailable(e.to_string())
        } else {
            VerifyError::Inference(e.to_string())
        }
    }
}

/// Image payload handed to a verification backend
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Preprocessed image bytes
    pub data: Vec<u8>,
    /// Sniffed MIME type (e.g. "image/jpeg")
    pub mime_type: String,
}

/// Raw backend output plus the derived accept/reject decision
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    /// Backend raw output: free text (hosted) or predicted label (local)
    pub raw: String,
    /// Verdict derived by the backend's rule set
    pub accepted: bool,
}

/// Contract shared by both classifier variants
///
/// `prompt` is the challenge's natural-language verification prompt; the
/// local fixed-label variant ignores it.
#[async_trait::async_trait]
pub trait VerificationBackend: Send + Sync {
    /// Backend name for logging and diagnostics
    fn name(&self) -> &'static str;

    /// Classify an image, producing raw output and an accept/reject verdict
    async fn classify(
        &self,
        image: &ImagePayload,
        prompt: &str,
    ) -> Result<VerificationOutcome, VerifyError>;
}
