// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{normalize_url, resolve_config_path};

// Re-export the page-load pipeline from veil-core
pub use veil_core::{Config, LoadPhase, LoadedPage, PageRequest, load_page};
