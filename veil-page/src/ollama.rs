use crate::error::FilterError;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:11434";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Minimal client for a local Ollama instance.
///
/// One blocking request/response round trip per call. No retries: a failed
/// call is reported once and the caller decides what to do with it.
pub struct OllamaClient {
    client: Client,
    api_url: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaClient {
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

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit one prompt to `/api/generate` and return the model's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, FilterError> {
        let url = format!("{}/api/generate", self.api_url);
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        debug!(model = %self.model, url = %url, "submitting generate request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FilterError::Unavailable(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url
            )));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FilterError::MalformedResponse(e.to_string()))?;

        if let Some(err) = data.get("error").and_then(|e| e.as_str()) {
            return Err(FilterError::Unavailable(err.to_string()));
        }

        let text = data
            .get("response")
            .and_then(|r| r.as_str())
            .ok_or_else(|| FilterError::MalformedResponse("missing response field".to_string()))?;

        Ok(text.trim().to_string())
    }

    /// Probe `/api/tags` to check whether the endpoint is reachable.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.api_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(url = %url, "Ollama not available: {}", e);
                false
            }
        }
    }

    fn classify(&self, e: reqwest::Error) -> FilterError {
        if e.is_timeout() {
            FilterError::Timeout(self.timeout_secs)
        } else {
            FilterError::Unavailable(e.to_string())
        }
    }
}
