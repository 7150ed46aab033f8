use std::path::PathBuf;
use veil::{normalize_url, resolve_config_path};

#[test]
fn test_normalize_url_accepts_full_url() {
    assert_eq!(
        normalize_url("https://example.com/page"),
        Some("https://example.com/page".to_string())
    );
}

#[test]
fn test_normalize_url_keeps_http_scheme() {
    assert_eq!(
        normalize_url("http://example.com/"),
        Some("http://example.com/".to_string())
    );
}

#[test]
fn test_normalize_url_adds_https_to_bare_host() {
    assert_eq!(
        normalize_url("example.com"),
        Some("https://example.com/".to_string())
    );
}

#[test]
fn test_normalize_url_trims_whitespace() {
    assert_eq!(
        normalize_url("  example.com/news  "),
        Some("https://example.com/news".to_string())
    );
}

#[test]
fn test_normalize_url_rejects_other_schemes() {
    assert_eq!(normalize_url("ftp://example.com/file"), None);
    assert_eq!(normalize_url("file:///etc/passwd"), None);
}

#[test]
fn test_normalize_url_rejects_empty_and_garbage() {
    assert_eq!(normalize_url(""), None);
    assert_eq!(normalize_url("   "), None);
    assert_eq!(normalize_url("not a url at all"), None);
}

#[test]
fn test_normalize_url_handles_host_with_port() {
    assert_eq!(
        normalize_url("localhost:8080/admin"),
        Some("https://localhost:8080/admin".to_string())
    );
}

#[test]
fn test_resolve_config_path_explicit_wins() {
    let explicit = "/etc/veil/custom.toml".to_string();
    assert_eq!(
        resolve_config_path(Some(&explicit)),
        PathBuf::from("/etc/veil/custom.toml")
    );
}

#[test]
fn test_resolve_config_path_expands_tilde() {
    let explicit = "~/veil.toml".to_string();
    let resolved = resolve_config_path(Some(&explicit));
    assert!(!resolved.to_string_lossy().starts_with('~'));
    assert!(resolved.to_string_lossy().ends_with("veil.toml"));
}

#[test]
fn test_resolve_config_path_default_is_per_user() {
    // No local veil.toml in the test runner's cwd, so the per-user
    // location should come back.
    let resolved = resolve_config_path(None);
    assert!(resolved.to_string_lossy().ends_with("veil.toml"));
}
