//! Hosted vision-language classifier (deployment variant A)
//!
//! Sends the photo plus the challenge's natural-language verification
//! prompt to an external multimodal inference endpoint and interprets the
//! free-form text reply with the keyword rule set. The endpoint URL and
//! API key come from configuration; every request carries an explicit
//! timeout, and expiry surfaces as `VerifyError::Unavailable`.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use super::verdict;
use super::verify::{ImagePayload, VerificationBackend, VerificationOutcome, VerifyError};

const USER_AGENT: &str = "GoodDeedGo/0.1.0 (+https://gooddeedgo.app)";

/// Response body of the vision-language endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VisionResponse {
    /// Free-form model reply
    pub text: String,
}

/// Vision-language endpoint client
pub struct HostedClassifier {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HostedClassifier {
    /// Create a new hosted classifier client
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self, VerifyError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl VerificationBackend for HostedClassifier {
    fn name(&self) -> &'static str {
        "hosted-vision"
    }

    async fn classify(
        &self,
        image: &ImagePayload,
        prompt: &str,
    ) -> Result<VerificationOutcome, VerifyError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&image.data);

        let body = json!({
            "prompt": prompt,
            "image": {
                "mime_type": image.mime_type,
                "data": encoded,
            },
        });

        tracing::debug!(
            endpoint = %self.endpoint,
            prompt,
            image_bytes = image.data.len(),
            "Querying vision endpoint"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(VerifyError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VerifyError::Api(status.as_u16(), error_text));
        }

        let reply: VisionResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::Inference(e.to_string()))?;

        let accepted = verdict::keyword_verdict(&reply.text);

        tracing::info!(
            accepted,
            reply_chars = reply.text.len(),
            "Vision endpoint reply interpreted"
        );

        Ok(VerificationOutcome {
            raw: reply.text,
            accepted,
        })
    }
}
