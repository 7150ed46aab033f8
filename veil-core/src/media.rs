use regex::Regex;
use std::sync::LazyLock;

const MEDIA_BLOCK_CSS: &str = r#"<style id="veil-media-blocker">
video, img, picture, iframe, embed, object, canvas {
    display: none !important;
    visibility: hidden !important;
    width: 0 !important;
    height: 0 !important;
}
</style>"#;

// Paired elements first, then self-closing leftovers. Compiled once; the
// patterns are constants and remove_media runs once per page load.
static MEDIA_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<picture[^>]*>.*?</picture>",
        r"(?is)<video[^>]*>.*?</video>",
        r"(?is)<iframe[^>]*>.*?</iframe>",
        r"(?is)<object[^>]*>.*?</object>",
        r"(?is)<canvas[^>]*>.*?</canvas>",
        r"(?i)<img[^>]*/?>",
        r"(?i)<video[^>]*/?>",
        r"(?i)<source[^>]*/?>",
        r"(?i)<embed[^>]*/?>",
        r"(?i)<canvas[^>]*/?>",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static BACKGROUND_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)background(-image)?\s*:\s*[^;'\x22]*url\([^)]*\)[^;'\x22]*;?").unwrap()
});

static HEAD_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<head[^>]*>").unwrap());
static BODY_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<body[^>]*>").unwrap());

/// Strip images, videos and embedded media from an HTML document.
///
/// Element removal is regex-based, matching how pages are commonly mangled
/// rather than fully parsed; a blocking CSS rule is injected as well so
/// media added by page scripts stays hidden in the renderer.
pub fn remove_media(html: &str) -> String {
    let mut html = html.to_string();

    for re in MEDIA_PATTERNS.iter() {
        html = re.replace_all(&html, "").into_owned();
    }

    // Background images in inline styles.
    html = BACKGROUND_IMAGE.replace_all(&html, "").into_owned();

    inject_into_head(&html, MEDIA_BLOCK_CSS)
}

/// Insert `block` inside `<head>`, or before `<body>`, or prepend it when
/// the document has neither.
fn inject_into_head(html: &str, block: &str) -> String {
    if let Some(m) = HEAD_OPEN.find(html) {
        let mut out = String::with_capacity(html.len() + block.len());
        out.push_str(&html[..m.end()]);
        out.push_str(block);
        out.push_str(&html[m.end()..]);
        return out;
    }

    if let Some(m) = BODY_OPEN.find(html) {
        let mut out = String::with_capacity(html.len() + block.len());
        out.push_str(&html[..m.start()]);
        out.push_str(block);
        out.push_str(&html[m.start()..]);
        return out;
    }

    format!("{block}{html}")
}
