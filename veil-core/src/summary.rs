use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use veil_page::{OllamaClient, escape_html};

const MAX_SECTIONS: usize = 10;
const MAX_BULLETS: usize = 5;
const SECTION_EXCERPT_CHARS: usize = 1500;
const PROMPT_CONTENT_CHARS: usize = 2000;

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// A heading plus the text that follows it, up to the next heading.
#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    pub content: String,
}

/// Extract summarizable sections from a document.
///
/// Primary strategy is heading-anchored: each `h1`-`h6` claims the sibling
/// text up to the next heading. Documents with no headings fall back to a
/// single section drawn from `article`, `main` or `body`.
pub fn extract_sections(html: &str) -> Vec<Section> {
    let document = Html::parse_document(html);
    let heading_selector = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();

    let mut sections = Vec::new();
    for heading in document.select(&heading_selector) {
        let title = collapse_whitespace(&heading.text().collect::<Vec<_>>().join(" "));
        if title.is_empty() {
            continue;
        }

        let content = sibling_text(heading);
        if content.is_empty() {
            continue;
        }

        sections.push(Section {
            title,
            content: truncate_chars(&content, SECTION_EXCERPT_CHARS),
        });
        if sections.len() >= MAX_SECTIONS {
            break;
        }
    }

    if sections.is_empty()
        && let Some(content) = fallback_content(&document)
    {
        sections.push(Section {
            title: "Page content".to_string(),
            content: truncate_chars(&content, SECTION_EXCERPT_CHARS),
        });
    }

    sections
}

/// Collect text from the siblings following a heading, stopping at the next
/// heading.
fn sibling_text(heading: ElementRef) -> String {
    let mut parts: Vec<String> = Vec::new();

    for sibling in heading.next_siblings() {
        if let Some(element) = ElementRef::wrap(sibling) {
            if HEADING_TAGS.contains(&element.value().name()) {
                break;
            }
            let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
            if !text.is_empty() {
                parts.push(text);
            }
        } else if let Some(text) = sibling.value().as_text() {
            let text = collapse_whitespace(text);
            if !text.is_empty() {
                parts.push(text);
            }
        }
    }

    parts.join("\n\n")
}

fn fallback_content(document: &Html) -> Option<String> {
    for selector in ["article", "main", "body"] {
        let selector = Selector::parse(selector).unwrap();
        if let Some(element) = document.select(&selector).next() {
            let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
            if text.len() > 50 {
                return Some(text);
            }
        }
    }
    None
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Normalize model output into at most `MAX_BULLETS` bullet lines.
fn clean_bullets(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let stripped = line.trim_start_matches(['-', '•', '*', ' ']).trim();
            format!("- {stripped}")
        })
        .take(MAX_BULLETS)
        .collect()
}

/// Ask the model for bullet summaries of one section. A failed call keeps
/// the section excerpt with no bullets; it never fails the page.
pub async fn summarize_section(client: &OllamaClient, section: &Section) -> Vec<String> {
    let prompt = format!(
        r#"Given the following content section, provide 3-5 concise bullet points summarizing the key information.

Title: {}

Content:
{}

Provide only the bullet points, one per line, starting with "- ". Do not include the title or any other text."#,
        section.title,
        truncate_chars(&section.content, PROMPT_CONTENT_CHARS)
    );

    match client.generate(&prompt).await {
        Ok(text) => clean_bullets(&text),
        Err(e) => {
            warn!(title = %section.title, "summary generation failed: {}", e);
            Vec::new()
        }
    }
}

/// Replace a page with its per-section summary view.
pub async fn summary_page(html: &str, url: &str, client: &OllamaClient) -> String {
    let sections = extract_sections(html);
    if sections.is_empty() {
        return format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>No Content Found</title></head>
<body>
<h1>No Content Found</h1>
<p>Could not extract meaningful content from this page.</p>
<p><a href="{}">View original page</a></p>
</body>
</html>"#,
            escape_html(url)
        );
    }

    let mut summarized = Vec::with_capacity(sections.len());
    for section in &sections {
        let bullets = summarize_section(client, section).await;
        summarized.push((section, bullets));
    }

    build_summary_html(&summarized, url)
}

fn build_summary_html(sections: &[(&Section, Vec<String>)], url: &str) -> String {
    let mut out = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Summary View</title>
<style>
body {{ font-family: -apple-system, 'Segoe UI', Arial, sans-serif; line-height: 1.6; color: #333; max-width: 900px; margin: 0 auto; padding: 20px; }}
.section {{ margin-bottom: 40px; padding: 20px; background: #f9f9f9; border-radius: 8px; border-left: 4px solid #007AFF; }}
.section-title {{ font-size: 20px; font-weight: 600; margin-bottom: 15px; }}
.summary li {{ margin-bottom: 8px; }}
.excerpt {{ background: #fff; padding: 15px; border: 1px solid #e0e0e0; border-radius: 4px; font-size: 14px; }}
.url-info {{ font-size: 12px; color: #666; margin-bottom: 20px; }}
</style>
</head>
<body>
<div class="url-info">Source: {}</div>
<h1>Content Summary</h1>
"#,
        escape_html(url)
    );

    for (section, bullets) in sections {
        out.push_str("<div class=\"section\">\n");
        out.push_str(&format!(
            "<div class=\"section-title\">{}</div>\n",
            escape_html(&section.title)
        ));
        if !bullets.is_empty() {
            out.push_str("<ul class=\"summary\">\n");
            for bullet in bullets {
                let text = bullet.trim_start_matches("- ");
                out.push_str(&format!("<li>{}</li>\n", escape_html(text)));
            }
            out.push_str("</ul>\n");
        }
        out.push_str(&format!(
            "<div class=\"excerpt\">{}</div>\n</div>\n",
            escape_html(&section.content)
        ));
    }

    out.push_str("</body>\n</html>");
    out
}
