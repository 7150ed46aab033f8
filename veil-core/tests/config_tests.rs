// Tests for configuration loading and default merging

use std::io::Write;
use tempfile::NamedTempFile;
use veil_core::Config;
use veil_core::config::{DEFAULT_API_URL, DEFAULT_CONFIG_TOML, DEFAULT_MODEL};

#[test]
fn test_missing_file_uses_defaults() {
    let config = Config::load(std::path::Path::new("/nonexistent/veil.toml"));

    assert!(config.filtering.enabled);
    assert_eq!(config.ollama.model, DEFAULT_MODEL);
    assert_eq!(config.ollama.api_url, DEFAULT_API_URL);
    assert_eq!(config.topics.len(), 3);
    assert!(config.topics.contains(&"advertising".to_string()));
}

#[test]
fn test_full_file_overrides_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
topics = ["politics"]

[ollama]
model = "llama3.2"
api_url = "http://10.0.0.5:11434"

[filtering]
enabled = false
"#
    )
    .unwrap();

    let config = Config::load(file.path());

    assert_eq!(config.topics, vec!["politics".to_string()]);
    assert_eq!(config.ollama.model, "llama3.2");
    assert_eq!(config.ollama.api_url, "http://10.0.0.5:11434");
    assert!(!config.filtering.enabled);
}

#[test]
fn test_partial_section_keeps_sibling_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[ollama]
model = "mistral"
"#
    )
    .unwrap();

    let config = Config::load(file.path());

    // Only the named key changes; the rest of the section stays default.
    assert_eq!(config.ollama.model, "mistral");
    assert_eq!(config.ollama.api_url, DEFAULT_API_URL);
    assert_eq!(config.fetch.timeout_secs, 30);
    assert!(config.filtering.enabled);
}

#[test]
fn test_unparsable_file_falls_back_to_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "this is not [valid toml").unwrap();

    let config = Config::load(file.path());

    assert!(config.filtering.enabled);
    assert_eq!(config.ollama.model, DEFAULT_MODEL);
}

#[test]
fn test_default_template_parses_to_defaults() {
    let from_template: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
    let defaults = Config::default();

    assert_eq!(from_template.topics, defaults.topics);
    assert_eq!(from_template.ollama.model, defaults.ollama.model);
    assert_eq!(from_template.ollama.api_url, defaults.ollama.api_url);
    assert_eq!(from_template.filtering.enabled, defaults.filtering.enabled);
    assert_eq!(from_template.fetch.timeout_secs, defaults.fetch.timeout_secs);
    assert_eq!(from_template.fetch.max_body_mb, defaults.fetch.max_body_mb);
    assert_eq!(from_template.capture.width, defaults.capture.width);
    assert_eq!(from_template.capture.height, defaults.capture.height);
    assert_eq!(from_template.vision.model, defaults.vision.model);
    assert_eq!(from_template.vision.ocr_model, defaults.vision.ocr_model);
}

#[test]
fn test_vision_defaults_and_partial_override() {
    let config = Config::default();
    assert_eq!(config.vision.model, "qwen3-vl:2b");
    assert_eq!(config.vision.ocr_model, "deepseek-ocr");
    assert_eq!(config.vision.timeout_secs, 120);

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[vision]
ocr_model = "granite-ocr"
"#
    )
    .unwrap();

    let config = Config::load(file.path());
    assert_eq!(config.vision.ocr_model, "granite-ocr");
    assert_eq!(config.vision.model, "qwen3-vl:2b");
}

#[test]
fn test_filter_options_mirror_config() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
topics = ["ads", "spam"]

[ollama]
model = "llama3.2"
timeout_secs = 60

[filtering]
enabled = false
"#
    )
    .unwrap();

    let config = Config::load(file.path());
    let options = config.filter_options();

    assert_eq!(options.topics, vec!["ads", "spam"]);
    assert_eq!(options.model, "llama3.2");
    assert_eq!(options.timeout_secs, 60);
    assert!(!options.enabled);
}

#[test]
fn test_max_body_bytes_conversion() {
    let config = Config::default();
    assert_eq!(config.max_body_bytes(), 10 * 1024 * 1024);
}
