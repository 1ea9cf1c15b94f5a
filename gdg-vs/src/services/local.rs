//! Local fixed-label classifier (deployment variant B)
//!
//! Prepares a normalized 224x224 RGB tensor from the photo and sends it to
//! a local inference endpoint serving the quantized 4-class deed model.
//! The reply is a 4-score vector; the arg-max label decides the verdict
//! (rule set B). The challenge prompt is ignored by this variant.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use super::verdict;
use super::verify::{ImagePayload, VerificationBackend, VerificationOutcome, VerifyError};

/// Model input edge length in pixels
pub const INPUT_EDGE: u32 = 224;

/// Response body of the local inference endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoreResponse {
    /// One score per class, in `verdict::CLASS_LABELS` order
    pub scores: Vec<f32>,
}

/// Local inference endpoint client
pub struct LocalClassifier {
    http_client: reqwest::Client,
    endpoint: String,
}

impl LocalClassifier {
    /// Create a new local classifier client
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, VerifyError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }
}

/// Decode, resize to 224x224 RGB, and normalize pixels to [0, 1]
///
/// Row-major RGB float tensor, length 224 * 224 * 3.
pub fn prepare_tensor(data: &[u8]) -> Result<Vec<f32>, VerifyError> {
    let img = image::load_from_memory(data)
        .map_err(|e| VerifyError::Inference(format!("could not decode image: {e}")))?;

    let rgb = img
        .resize_exact(INPUT_EDGE, INPUT_EDGE, FilterType::Triangle)
        .to_rgb8();

    Ok(rgb.as_raw().iter().map(|&p| p as f32 / 255.0).collect())
}

#[async_trait::async_trait]
impl VerificationBackend for LocalClassifier {
    fn name(&self) -> &'static str {
        "local-classifier"
    }

    async fn classify(
        &self,
        image: &ImagePayload,
        _prompt: &str,
    ) -> Result<VerificationOutcome, VerifyError> {
        let tensor = prepare_tensor(&image.data)?;

        tracing::debug!(
            endpoint = %self.endpoint,
            tensor_len = tensor.len(),
            "Querying local inference endpoint"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&json!({ "inputs": tensor }))
            .send()
            .await
            .map_err(VerifyError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VerifyError::Api(status.as_u16(), error_text));
        }

        let reply: ScoreResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::Inference(e.to_string()))?;

        if reply.scores.len() != verdict::CLASS_LABELS.len() {
            return Err(VerifyError::Inference(format!(
                "expected {} scores, got {}",
                verdict::CLASS_LABELS.len(),
                reply.scores.len()
            )));
        }

        let label = verdict::CLASS_LABELS[verdict::argmax(&reply.scores)];
        let accepted = verdict::label_verdict(label);

        tracing::info!(label, accepted, "Local classifier prediction");

        Ok(VerificationOutcome {
            raw: label.to_string(),
            accepted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, RgbImage};
    use std::io::Cursor;

    fn encode_png(width: u32, height: u32, pixel: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb(pixel));
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageOutputFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_prepare_tensor_shape_and_range() {
        let data = encode_png(64, 48, [255, 0, 128]);
        let tensor = prepare_tensor(&data).unwrap();

        assert_eq!(tensor.len(), (INPUT_EDGE * INPUT_EDGE * 3) as usize);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_prepare_tensor_normalizes_values() {
        let data = encode_png(10, 10, [255, 255, 255]);
        let tensor = prepare_tensor(&data).unwrap();
        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < 1e-6));

        let data = encode_png(10, 10, [0, 0, 0]);
        let tensor = prepare_tensor(&data).unwrap();
        assert!(tensor.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn test_prepare_tensor_rejects_garbage() {
        assert!(prepare_tensor(b"not an image").is_err());
    }

    #[test]
    fn test_client_creation() {
        let client = LocalClassifier::new(
            "http://127.0.0.1:8501/v1/deed-classifier".to_string(),
            Duration::from_secs(30),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_score_response_deserialization() {
        let reply: ScoreResponse =
            serde_json::from_str(r#"{"scores": [0.05, 0.1, 0.05, 0.8]}"#).unwrap();
        let label = verdict::CLASS_LABELS[verdict::argmax(&reply.scores)];
        assert_eq!(label, "recycling");
    }
}
