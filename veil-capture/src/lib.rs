pub mod error;
pub mod runner;
pub mod vision;

pub use error::CaptureError;
pub use runner::{CaptureOptions, capture_html, capture_url, default_output_path, detect_browser};
pub use vision::{VisionClient, VisionError};
