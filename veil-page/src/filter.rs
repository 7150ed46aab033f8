use crate::error::FilterError;
use crate::ollama::{self, OllamaClient};
use crate::result::FilterResult;
use tracing::{debug, warn};

/// Floor for the sanity bound on rewritten output when no explicit limit is
/// configured; the effective bound is the larger of this and 4x the input.
const MIN_RESPONSE_CEILING: usize = 10 * 1024 * 1024;

/// Configuration for one filter instance. Built from the loaded config file
/// and passed in explicitly so tests can inject distinct values.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    pub topics: Vec<String>,
    pub model: String,
    pub api_url: String,
    pub enabled: bool,
    pub timeout_secs: u64,
    /// Sanity bound on the rewritten HTML in bytes. 0 derives the bound from
    /// the input size.
    pub max_response_bytes: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            topics: Vec::new(),
            model: "qwen2.5:1.5b".to_string(),
            api_url: ollama::DEFAULT_API_URL.to_string(),
            enabled: true,
            timeout_secs: ollama::DEFAULT_TIMEOUT_SECS,
            max_response_bytes: 0,
        }
    }
}

/// Rewrites HTML through a local model to elide configured topics.
///
/// `apply` never fails the page load: every failure path returns the original
/// HTML unchanged, tagged with the reason.
pub struct ContentFilter {
    client: OllamaClient,
    topics: Vec<String>,
    enabled: bool,
    max_response_bytes: usize,
}

impl ContentFilter {
    pub fn new(options: &FilterOptions) -> Self {
        Self {
            client: OllamaClient::new(&options.api_url, &options.model, options.timeout_secs),
            topics: options.topics.clone(),
            enabled: options.enabled,
            max_response_bytes: options.max_response_bytes,
        }
    }

    /// Apply the topic filter to `html`.
    ///
    /// Disabled filtering or an empty topic list short-circuits with the
    /// input unchanged and no network call.
    pub async fn apply(&self, html: &str) -> FilterResult {
        if !self.enabled || self.topics.is_empty() {
            return FilterResult::passthrough(html.to_string());
        }

        let prompt = build_prompt(html, &self.topics);

        match self.client.generate(&prompt).await {
            Ok(text) => {
                let rewritten = strip_code_fences(&text);
                match self.validate_rewrite(&rewritten, html.len()) {
                    Ok(()) => {
                        debug!(
                            original = html.len(),
                            rewritten = rewritten.len(),
                            "content filtered"
                        );
                        FilterResult::filtered(rewritten)
                    }
                    Err(e) => {
                        warn!("rejecting filter output, using original HTML: {}", e);
                        FilterResult::fallback(html.to_string(), e)
                    }
                }
            }
            Err(e) => {
                warn!("content filtering failed, using original HTML: {}", e);
                FilterResult::fallback(html.to_string(), e)
            }
        }
    }

    /// Probe the configured endpoint. Used at startup to warn early when
    /// filtering is on but the model service is offline.
    pub async fn endpoint_available(&self) -> bool {
        self.client.is_available().await
    }

    fn validate_rewrite(&self, rewritten: &str, input_len: usize) -> Result<(), FilterError> {
        if rewritten.is_empty() {
            return Err(FilterError::MalformedResponse("empty response".to_string()));
        }
        if !rewritten.contains('<') {
            return Err(FilterError::MalformedResponse(
                "response is not HTML".to_string(),
            ));
        }

        let ceiling = if self.max_response_bytes > 0 {
            self.max_response_bytes
        } else {
            (input_len * 4).max(MIN_RESPONSE_CEILING)
        };
        if rewritten.len() > ceiling {
            return Err(FilterError::MalformedResponse(format!(
                "response of {} bytes exceeds the {} byte sanity bound",
                rewritten.len(),
                ceiling
            )));
        }

        Ok(())
    }
}

/// Build the single instruction payload: topics, the fixed removal
/// instruction, and the raw HTML.
fn build_prompt(html: &str, topics: &[String]) -> String {
    let topics_str = topics
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are a web content filter. Your task is to remove any content from the HTML that is related to these topics: {topics_str}.

Instructions:
1. Remove entire paragraphs, sections, divs, or elements that contain content related to any of these topics
2. Maintain the overall structure and flow of the document
3. Ensure the remaining content reads naturally and fluidly
4. Preserve all HTML structure, CSS classes, and formatting
5. Do not add any comments or explanations - only return the modified HTML
6. If a section header is removed, ensure the document flow still makes sense

Return ONLY the modified HTML, nothing else.

HTML to filter:
{html}"#
    )
}

/// Models sometimes wrap their output in a markdown code block; unwrap it.
fn strip_code_fences(text: &str) -> String {
    if !text.starts_with("```") {
        return text.to_string();
    }

    let mut lines: Vec<&str> = text.lines().collect();
    if let Some(first) = lines.first()
        && first.starts_with("```")
    {
        lines.remove(0);
    }
    if let Some(last) = lines.last()
        && last.trim() == "```"
    {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options(server: &MockServer, topics: &[&str]) -> FilterOptions {
        FilterOptions {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            api_url: server.uri(),
            timeout_secs: 1,
            ..FilterOptions::default()
        }
    }

    fn generate_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "qwen2.5:1.5b",
            "response": text,
            "done": true,
        }))
    }

    #[tokio::test]
    async fn test_disabled_filter_makes_no_network_call() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut opts = options(&mock_server, &["advertising"]);
        opts.enabled = false;
        let filter = ContentFilter::new(&opts);

        let result = filter.apply("<html><body>Ad: buy now</body></html>").await;

        assert_eq!(result.html, "<html><body>Ad: buy now</body></html>");
        assert!(!result.was_filtered);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_empty_topics_make_no_network_call() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let filter = ContentFilter::new(&options(&mock_server, &[]));
        let result = filter.apply("<html></html>").await;

        assert_eq!(result.html, "<html></html>");
        assert!(!result.was_filtered);
    }

    #[tokio::test]
    async fn test_successful_rewrite() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(generate_response("<html><body></body></html>"))
            .mount(&mock_server)
            .await;

        let filter = ContentFilter::new(&options(&mock_server, &["advertising"]));
        let result = filter.apply("<html><body>Ad: buy now</body></html>").await;

        assert_eq!(result.html, "<html><body></body></html>");
        assert!(result.was_filtered);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_code_fenced_rewrite_is_unwrapped() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(generate_response(
                "```html\n<html><body>kept</body></html>\n```",
            ))
            .mount(&mock_server)
            .await;

        let filter = ContentFilter::new(&options(&mock_server, &["advertising"]));
        let result = filter.apply("<html><body>kept. Ad.</body></html>").await;

        assert_eq!(result.html, "<html><body>kept</body></html>");
        assert!(result.was_filtered);
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_original() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                generate_response("<html></html>")
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let original = "<html><body>Ad: buy now</body></html>";
        let filter = ContentFilter::new(&options(&mock_server, &["advertising"]));
        let result = filter.apply(original).await;

        assert_eq!(result.html, original);
        assert!(!result.was_filtered);
        assert!(matches!(result.error, Some(FilterError::Timeout(1))));
    }

    #[tokio::test]
    async fn test_server_error_falls_back_to_original() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let original = "<html><body>content</body></html>";
        let filter = ContentFilter::new(&options(&mock_server, &["advertising"]));
        let result = filter.apply(original).await;

        assert_eq!(result.html, original);
        assert!(matches!(result.error, Some(FilterError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_non_html_response_falls_back_to_original() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(generate_response(
                "I cannot filter this content, sorry about that.",
            ))
            .mount(&mock_server)
            .await;

        let original = "<html><body>content</body></html>";
        let filter = ContentFilter::new(&options(&mock_server, &["advertising"]));
        let result = filter.apply(original).await;

        assert_eq!(result.html, original);
        assert!(matches!(
            result.error,
            Some(FilterError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_response_falls_back_to_original() {
        let mock_server = MockServer::start().await;
        let huge = format!("<html>{}</html>", "x".repeat(4096));
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(generate_response(&huge))
            .mount(&mock_server)
            .await;

        let original = "<html><body>content</body></html>";
        let mut opts = options(&mock_server, &["advertising"]);
        opts.max_response_bytes = 1024;
        let filter = ContentFilter::new(&opts);
        let result = filter.apply(original).await;

        assert_eq!(result.html, original);
        assert!(matches!(
            result.error,
            Some(FilterError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_strip_code_fences_plain_text_untouched() {
        assert_eq!(strip_code_fences("<html></html>"), "<html></html>");
    }

    #[test]
    fn test_strip_code_fences_without_language_tag() {
        assert_eq!(strip_code_fences("```\n<p>hi</p>\n```"), "<p>hi</p>");
    }

    #[test]
    fn test_build_prompt_quotes_topics() {
        let prompt = build_prompt("<html></html>", &["ads".to_string(), "spam".to_string()]);
        assert!(prompt.contains("\"ads\", \"spam\""));
        assert!(prompt.contains("<html></html>"));
    }
}
