use chrono::{DateTime, Utc};
use std::time::Duration;

/// A single page-load request. Immutable once issued.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

impl PageRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Phases of a page load, reported through the progress callback. One page
/// load moves through these strictly in order; no phase runs concurrently
/// with another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Fetching,
    Filtering,
    Summarizing,
}

impl std::fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadPhase::Fetching => write!(f, "Loading page..."),
            LoadPhase::Filtering => write!(f, "Filtering content..."),
            LoadPhase::Summarizing => write!(f, "Generating summaries..."),
        }
    }
}

/// The finished product of one page load, handed to the renderer.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub request: PageRequest,
    /// Final URL after redirects.
    pub final_url: String,
    pub html: String,
    /// True only when the filter stage executed successfully.
    pub was_filtered: bool,
    /// Non-blocking warning when filtering was attempted but fell back.
    pub filter_warning: Option<String>,
    pub response_time: Duration,
}
