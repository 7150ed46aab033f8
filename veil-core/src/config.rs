use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use veil_page::FilterOptions;

pub const DEFAULT_MODEL: &str = "qwen2.5:1.5b";
pub const DEFAULT_API_URL: &str = "http://localhost:11434";

/// The default `veil.toml` written by `veil init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# Veil configuration.
# Topics to elide from pages when filtering is on.
topics = [
    "advertising",
    "sponsored content",
    "newsletter signup",
]

[ollama]
model = "qwen2.5:1.5b"
api_url = "http://localhost:11434"

[filtering]
enabled = true

[display]
# Strip images, videos and embeds before rendering.
remove_images = false
# Replace pages with a per-section summary view.
summary_view = false

[fetch]
timeout_secs = 30
max_body_mb = 10

[capture]
width = 1200
height = 800
timeout_secs = 30

[vision]
# Models used to read captured screenshots back as text.
model = "qwen3-vl:2b"
ocr_model = "deepseek-ocr"
timeout_secs = 120
"#;

fn default_topics() -> Vec<String> {
    vec![
        "advertising".to_string(),
        "sponsored content".to_string(),
        "newsletter signup".to_string(),
    ]
}

/// Application configuration, loaded once at startup and treated as
/// read-only for the session. Reloading means calling [`Config::load`]
/// again and swapping the whole value; it is never partially mutated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub topics: Vec<String>,
    pub ollama: OllamaConfig,
    pub filtering: FilteringConfig,
    pub display: DisplayConfig,
    pub fetch: FetchConfig,
    pub capture: CaptureConfig,
    pub vision: VisionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topics: default_topics(),
            ollama: OllamaConfig::default(),
            filtering: FilteringConfig::default(),
            display: DisplayConfig::default(),
            fetch: FetchConfig::default(),
            capture: CaptureConfig::default(),
            vision: VisionConfig::default(),
        }
    }
}

/// `[ollama]` — the local inference endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub model: String,
    pub api_url: String,
    /// Budget for one filter round trip, in seconds.
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 120,
        }
    }
}

/// `[filtering]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilteringConfig {
    pub enabled: bool,
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// `[display]` — page transforms applied before rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub remove_images: bool,
    pub summary_view: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            remove_images: false,
            summary_view: false,
        }
    }
}

/// `[fetch]` — transfer budgets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_body_mb: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_body_mb: 10,
        }
    }
}

/// `[capture]` — screenshot defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
    pub timeout_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            timeout_secs: 30,
        }
    }
}

/// `[vision]` — models used to read captured screenshots back as text.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VisionConfig {
    /// General vision-language model, used for headline extraction.
    pub model: String,
    /// OCR-specialized model, used for plain text extraction.
    pub ocr_model: String,
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: "qwen3-vl:2b".to_string(),
            ocr_model: "deepseek-ocr".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults when the
    /// file is missing or unreadable. A present-but-broken file is reported
    /// and ignored rather than aborting startup.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!(
                "no config file at {}, using built-in defaults",
                path.display()
            );
            return Self::default();
        }

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("failed to read {}: {}. Using defaults.", path.display(), e);
                return Self::default();
            }
        };

        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("failed to parse {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// The filter options implied by this configuration.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            topics: self.topics.clone(),
            model: self.ollama.model.clone(),
            api_url: self.ollama.api_url.clone(),
            enabled: self.filtering.enabled,
            timeout_secs: self.ollama.timeout_secs,
            max_response_bytes: 0,
        }
    }

    pub fn max_body_bytes(&self) -> u64 {
        self.fetch.max_body_mb * 1024 * 1024
    }
}
