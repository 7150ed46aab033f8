use thiserror::Error;

/// Errors from the fetch stage. All of these are terminal for a page load:
/// no content is produced when a fetch fails.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("response too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
}

/// Errors from the filter stage. Never terminal: every one of these falls
/// back to the original, unfiltered HTML.
#[derive(Error, Debug, Clone)]
pub enum FilterError {
    #[error("filter endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("filter request timed out after {0} seconds")]
    Timeout(u64),

    #[error("filter returned an unusable response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;
