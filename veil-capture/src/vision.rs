use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_VLM_MODEL: &str = "qwen3-vl:2b";
pub const DEFAULT_OCR_MODEL: &str = "deepseek-ocr";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Token budget per readout call.
const MAX_RESPONSE_TOKENS: u32 = 2048;

const OCR_PROMPT: &str = "Extract all text from this image.";
const HEADLINES_PROMPT: &str = "Please read the image and extract news content";

/// Errors from reading a screenshot through the vision model. None of these
/// invalidate the screenshot itself; the image is already on disk.
#[derive(Error, Debug, Clone)]
pub enum VisionError {
    #[error("vision endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("vision request timed out after {0} seconds")]
    Timeout(u64),

    #[error("vision model returned an unusable response: {0}")]
    MalformedResponse(String),
}

/// Client for reading captured images through an Ollama-hosted vision model.
///
/// One request/response round trip per call, no retries. The same endpoint
/// serves OCR and headline extraction; only the model and prompt differ.
pub struct VisionClient {
    client: Client,
    api_url: String,
    model: String,
    timeout_secs: u64,
}

impl VisionClient {
    pub fn new(api_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout_secs,
        }
    }

    /// Submit one image plus prompt to `/api/generate` and return the
    /// model's text.
    pub async fn query(&self, image: &[u8], prompt: &str) -> Result<String, VisionError> {
        let url = format!("{}/api/generate", self.api_url);
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "images": [BASE64.encode(image)],
            "stream": false,
            "options": {
                "temperature": 0.0,
                "num_predict": MAX_RESPONSE_TOKENS,
            },
        });

        debug!(model = %self.model, bytes = image.len(), "submitting vision request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VisionError::Unavailable(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url
            )));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| VisionError::MalformedResponse(e.to_string()))?;

        if let Some(err) = data.get("error").and_then(|e| e.as_str()) {
            return Err(VisionError::Unavailable(err.to_string()));
        }

        let text = data
            .get("response")
            .and_then(|r| r.as_str())
            .ok_or_else(|| VisionError::MalformedResponse("missing response field".to_string()))?;

        Ok(text.trim().to_string())
    }

    /// OCR: pull all visible text out of a screenshot.
    pub async fn extract_text(&self, image: &[u8]) -> Result<String, VisionError> {
        self.query(image, OCR_PROMPT).await
    }

    /// Pull news content (headlines and summaries) out of a screenshot.
    pub async fn extract_headlines(&self, image: &[u8]) -> Result<String, VisionError> {
        self.query(image, HEADLINES_PROMPT).await
    }

    /// Probe `/api/tags` to check whether the endpoint is reachable.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.api_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(url = %url, "vision endpoint not available: {}", e);
                false
            }
        }
    }

    fn classify(&self, e: reqwest::Error) -> VisionError {
        if e.is_timeout() {
            VisionError::Timeout(self.timeout_secs)
        } else {
            VisionError::Unavailable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_STUB: &[u8] = b"\x89PNG fake image bytes";

    fn client(server: &MockServer) -> VisionClient {
        VisionClient::new(&server.uri(), DEFAULT_VLM_MODEL, 1)
    }

    #[tokio::test]
    async fn test_query_sends_encoded_image_and_returns_text() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": DEFAULT_VLM_MODEL,
                "stream": false,
                "images": [BASE64.encode(PNG_STUB)],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "  Headline: it happened  ",
                "done": true,
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let text = client(&mock_server)
            .extract_headlines(PNG_STUB)
            .await
            .unwrap();

        assert_eq!(text, "Headline: it happened");
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .extract_text(PNG_STUB)
            .await
            .unwrap_err();

        assert!(matches!(err, VisionError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response": "late"}))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .extract_text(PNG_STUB)
            .await
            .unwrap_err();

        assert!(matches!(err, VisionError::Timeout(1)));
    }

    #[tokio::test]
    async fn test_missing_response_field_is_malformed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"done": true})),
            )
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).query(PNG_STUB, "read it").await.unwrap_err();

        assert!(matches!(err, VisionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_body_error_field_is_unavailable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "model 'qwen3-vl:2b' not found",
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).query(PNG_STUB, "read it").await.unwrap_err();

        assert!(matches!(err, VisionError::Unavailable(_)));
    }
}
