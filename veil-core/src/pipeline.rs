use crate::config::Config;
use crate::media;
use crate::page::{LoadPhase, LoadedPage, PageRequest};
use crate::summary;
use std::sync::Arc;
use tracing::info;
use veil_page::error::Result;
use veil_page::{ContentFilter, Fetcher, OllamaClient};

/// Callback for observing page-load phase transitions.
pub type LoadProgressCallback = Arc<dyn Fn(LoadPhase) + Send + Sync>;

/// Run one page load: fetch, then the configured transforms, strictly in
/// sequence. Each stage blocks until it completes or times out.
///
/// A fetch failure is terminal and becomes the `Err` value. A filter failure
/// is not: the page falls through with the original HTML and a warning
/// recorded on the result.
pub async fn load_page(
    request: PageRequest,
    config: &Config,
    filter_override: Option<bool>,
    progress: Option<LoadProgressCallback>,
) -> Result<LoadedPage> {
    let report = |phase: LoadPhase| {
        if let Some(ref callback) = progress {
            callback(phase);
        }
    };

    let fetcher = Fetcher::with_timeout(config.fetch.timeout_secs)
        .with_max_body_bytes(config.max_body_bytes());

    report(LoadPhase::Fetching);
    let page = fetcher.fetch(&request.url).await?;
    info!(
        url = %page.url,
        status = page.status_code,
        ms = page.response_time.as_millis() as u64,
        "page fetched"
    );

    let mut html = page.html;
    if config.display.remove_images {
        html = media::remove_media(&html);
    }

    if config.display.summary_view {
        report(LoadPhase::Summarizing);
        let client = OllamaClient::new(
            &config.ollama.api_url,
            &config.ollama.model,
            config.ollama.timeout_secs,
        );
        let html = summary::summary_page(&html, &page.url, &client).await;
        return Ok(LoadedPage {
            request,
            final_url: page.url,
            html,
            was_filtered: false,
            filter_warning: None,
            response_time: page.response_time,
        });
    }

    let mut options = config.filter_options();
    if let Some(enabled) = filter_override {
        options.enabled = enabled;
    }

    if options.enabled && !options.topics.is_empty() {
        report(LoadPhase::Filtering);
    }
    let filter = ContentFilter::new(&options);
    let result = filter.apply(&html).await;

    Ok(LoadedPage {
        request,
        final_url: page.url,
        html: result.html,
        was_filtered: result.was_filtered,
        filter_warning: result.error.map(|e| e.to_string()),
        response_time: page.response_time,
    })
}

/// Probe the inference endpoint when filtering is in play, so the shell can
/// warn up front instead of failing on the first page load.
pub async fn filter_endpoint_available(config: &Config) -> bool {
    if !config.filtering.enabled || config.topics.is_empty() {
        return true;
    }
    ContentFilter::new(&config.filter_options())
        .endpoint_available()
        .await
}
