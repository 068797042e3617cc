// src/extract/css.rs
// =============================================================================
// Finds image references written in CSS rather than HTML:
// - background-image: url(...) inside inline style="" attributes
// - every url(...) inside linked stylesheets
//
// Plus the "does this look like an image?" heuristic we apply to stylesheet
// URLs, since stylesheets also reference fonts, cursors and other CSS.
// =============================================================================

use crate::config::CrawlConfig;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

// url("a.png"), url('a.png') and url(a.png) all capture a.png
fn css_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"url\(["']?([^"')\s]+)["']?\)"#).expect("valid regex"))
}

// Case-sensitive on purpose: only the literal `background-image` property
fn background_image_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"background-image:\s*url\(["']?([^"')\s]+)["']?\)"#).expect("valid regex")
    })
}

/// Raw targets of `background-image: url(...)` in an inline style attribute.
pub fn background_image_urls(style: &str) -> Vec<&str> {
    captures(background_image_pattern(), style)
}

/// Raw targets of every `url(...)` in a stylesheet.
pub fn url_references(css: &str) -> Vec<&str> {
    captures(css_url_pattern(), css)
}

fn captures<'a>(pattern: &Regex, text: &'a str) -> Vec<&'a str> {
    pattern
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Loose image check for URLs found in stylesheets.
///
/// A URL counts as an image if its path ends in a known image extension, or if
/// the word "image" appears anywhere in it (any case). The second rule catches
/// CDN URLs like `/cdn/image/upload/abc123` that have no extension, at the cost
/// of false positives such as `/fonts/image-sans.woff2`. Those are harmless:
/// the downloader still refuses anything whose content type isn't `image/*`.
pub fn is_image_url(url: &Url, config: &CrawlConfig) -> bool {
    config.has_image_extension(url.path()) || url.as_str().to_ascii_lowercase().contains("image")
}
