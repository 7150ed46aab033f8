use crate::error::FilterError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A successfully fetched page, ready for filtering and rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: String,
    /// Response body. Non-HTML bodies are wrapped in `<pre>` so the renderer
    /// always receives an HTML document.
    pub html: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub response_time: Duration,
}

/// Outcome of one filter attempt.
///
/// `was_filtered` is true only when the filter ran to completion; on any
/// failure `html` is the original input, byte for byte, and `error` names the
/// reason. Produced once per page load and consumed immediately.
#[derive(Debug, Clone)]
pub struct FilterResult {
    pub html: String,
    pub was_filtered: bool,
    pub error: Option<FilterError>,
}

impl FilterResult {
    pub fn passthrough(html: String) -> Self {
        Self {
            html,
            was_filtered: false,
            error: None,
        }
    }

    pub fn filtered(html: String) -> Self {
        Self {
            html,
            was_filtered: true,
            error: None,
        }
    }

    pub fn fallback(original: String, error: FilterError) -> Self {
        Self {
            html: original,
            was_filtered: false,
            error: Some(error),
        }
    }
}
