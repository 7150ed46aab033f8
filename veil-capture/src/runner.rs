use crate::error::{CaptureError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

/// Ceiling on the captured image (10 MB raw PNG bytes).
const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Browser binaries to probe, in preference order.
const CANDIDATE_BROWSERS: &[&str] = &["chromium", "chrome", "google-chrome", "chromium-browser"];

/// Viewport and timeout settings for one capture.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub width: u32,
    pub height: u32,
    pub timeout_secs: u64,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            timeout_secs: 30,
        }
    }
}

/// Detect the first headless-capable browser binary on PATH.
pub fn detect_browser() -> Option<String> {
    for candidate in CANDIDATE_BROWSERS {
        if binary_on_path(candidate) {
            debug!(browser = *candidate, "headless browser detected on PATH");
            return Some((*candidate).to_string());
        }
    }
    None
}

fn binary_on_path(binary: &str) -> bool {
    if let Ok(path_var) = std::env::var("PATH") {
        for dir in path_var.split(':') {
            if Path::new(dir).join(binary).is_file() {
                return true;
            }
        }
    }
    false
}

/// Capture a screenshot of `url` into `output` (PNG).
pub async fn capture_url(url: &str, output: &Path, options: &CaptureOptions) -> Result<PathBuf> {
    let browser = detect_browser().ok_or(CaptureError::NoBrowser)?;
    run_capture(&browser, url, output, options).await
}

/// Render an HTML string and capture it into `output` (PNG).
///
/// The document is written to a temp file and captured through a `file://`
/// URL, so relative resources inside it will not resolve.
pub async fn capture_html(html: &str, output: &Path, options: &CaptureOptions) -> Result<PathBuf> {
    let browser = detect_browser().ok_or(CaptureError::NoBrowser)?;

    let tmp = TempDir::new()?;
    let page_path = tmp.path().join("page.html");
    std::fs::write(&page_path, html)?;

    let url = Url::from_file_path(&page_path)
        .map_err(|_| CaptureError::Spawn(format!("unusable temp path {}", page_path.display())))?;

    run_capture(&browser, url.as_str(), output, options).await
}

async fn run_capture(
    browser: &str,
    url: &str,
    output: &Path,
    options: &CaptureOptions,
) -> Result<PathBuf> {
    // Isolate each run in a temp dir; the browser writes the screenshot
    // there and the result is copied out afterwards.
    let tmp = TempDir::new()?;
    let screenshot_path = tmp.path().join("screenshot.png");

    let mut cmd = Command::new(browser);
    cmd.args(browser_args(&screenshot_path, url, options))
        .current_dir(tmp.path())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    debug!(browser = %browser, url = %url, "spawning headless browser");

    let mut child = cmd.spawn().map_err(|e| CaptureError::Spawn(e.to_string()))?;

    match timeout(Duration::from_secs(options.timeout_secs), child.wait()).await {
        Err(_elapsed) => {
            // Kill the child so a hung browser doesn't linger as a zombie.
            let _ = child.kill().await;
            warn!(url = %url, secs = options.timeout_secs, "screenshot timed out");
            return Err(CaptureError::Timeout(options.timeout_secs));
        }
        Ok(Err(e)) => return Err(CaptureError::Spawn(e.to_string())),
        Ok(Ok(status)) => {
            if !status.success() {
                // A non-zero exit can still leave a usable screenshot behind.
                warn!(url = %url, status = ?status, "browser exited with non-zero status");
            }
        }
    }

    if !screenshot_path.exists() {
        return Err(CaptureError::NoOutput);
    }

    let size = std::fs::metadata(&screenshot_path)?.len();
    if size == 0 {
        return Err(CaptureError::NoOutput);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(CaptureError::TooLarge(size));
    }

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    // Copy rather than rename: the temp dir may sit on a different filesystem.
    std::fs::copy(&screenshot_path, output)?;

    debug!(output = %output.display(), bytes = size, "screenshot saved");
    Ok(output.to_path_buf())
}

/// Chromium switches take `--flag=value` form; a bare `--screenshot` followed
/// by a separate path token would be parsed as a positional URL instead.
fn browser_args(screenshot_path: &Path, url: &str, options: &CaptureOptions) -> Vec<String> {
    vec![
        "--headless".to_string(),
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        format!("--screenshot={}", screenshot_path.display()),
        format!("--window-size={},{}", options.width, options.height),
        url.to_string(),
    ]
}

/// Timestamped default file name for scheduled or ad-hoc captures,
/// e.g. `veil_20250301_142255.png`.
pub fn default_output_path(dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("veil_{stamp}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_args_use_single_token_switches() {
        let options = CaptureOptions {
            width: 1920,
            height: 1080,
            timeout_secs: 30,
        };
        let args = browser_args(Path::new("/tmp/run/screenshot.png"), "https://example.com/", &options);

        assert!(args.contains(&"--screenshot=/tmp/run/screenshot.png".to_string()));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        // No bare switch should be left expecting a following value token.
        assert!(!args.contains(&"--screenshot".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://example.com/"));
    }

    #[test]
    fn test_default_options() {
        let options = CaptureOptions::default();
        assert_eq!(options.width, 1200);
        assert_eq!(options.height, 800);
        assert_eq!(options.timeout_secs, 30);
    }

    #[test]
    fn test_default_output_path_shape() {
        let path = default_output_path(Path::new("/tmp/shots"));
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("veil_"));
        assert!(name.ends_with(".png"));
        // veil_YYYYMMDD_HHMMSS.png
        assert_eq!(name.len(), "veil_20250301_142255.png".len());
    }

    #[test]
    fn test_binary_on_path_misses_nonsense() {
        assert!(!binary_on_path("definitely-not-a-real-binary-name"));
    }
}
