pub mod error;
pub mod fetcher;
pub mod filter;
pub mod ollama;
pub mod result;

pub use error::{FetchError, FilterError};
pub use fetcher::{Fetcher, escape_html};
pub use filter::{ContentFilter, FilterOptions};
pub use ollama::OllamaClient;
pub use result::{FetchedPage, FilterResult};
