use crate::error::{FetchError, Result};
use crate::result::FetchedPage;
use reqwest::Client;
use std::time::Instant;
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

/// Fetches raw HTML over HTTP with a bounded timeout and a response-size
/// ceiling. One attempt per call; retry policy belongs to the caller.
pub struct Fetcher {
    client: Client,
    timeout_secs: u64,
    max_body_bytes: u64,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("Veil/0.1 (https://github.com/trapdoorsec/veil)")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs((timeout_secs / 2).max(1)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            timeout_secs,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, bytes: u64) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Fetch `url` and return its body as HTML.
    ///
    /// Malformed input fails with `InvalidUrl` before any network I/O. The
    /// size ceiling is checked against `Content-Length` up front and again
    /// while streaming, so an oversized transfer is aborted rather than
    /// buffered; no partial HTML is ever surfaced.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(FetchError::InvalidUrl(format!(
                    "unsupported scheme '{other}' in {url}"
                )));
            }
        }
        if parsed.host_str().is_none() {
            return Err(FetchError::InvalidUrl(format!("missing host in {url}")));
        }

        debug!("Fetching {}", parsed);

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let mut response = response.error_for_status().map_err(|e| self.classify(e))?;

        let final_url = response.url().to_string();
        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(len) = response.content_length()
            && len > self.max_body_bytes
        {
            return Err(FetchError::PayloadTooLarge {
                size: len,
                limit: self.max_body_bytes,
            });
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            let size = body.len() as u64 + chunk.len() as u64;
            if size > self.max_body_bytes {
                return Err(FetchError::PayloadTooLarge {
                    size,
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }
        let response_time = start.elapsed();

        let text = String::from_utf8_lossy(&body).into_owned();
        let is_html = content_type
            .as_ref()
            .map(|ct| ct.contains("html"))
            .unwrap_or(true);
        let html = if is_html {
            text
        } else {
            wrap_preformatted(&text)
        };

        Ok(FetchedPage {
            url: final_url,
            html,
            status_code,
            content_type,
            response_time,
        })
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout_secs)
        } else {
            FetchError::Network(e)
        }
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a non-HTML body so the renderer always receives a document.
fn wrap_preformatted(text: &str) -> String {
    format!("<html><body><pre>{}</pre></body></html>", escape_html(text))
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
