// src/extract/html.rs
// =============================================================================
// This module pulls URLs out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// What we look for:
// - <img src>, plus the lazy-loading attributes data-src, data-lazy and
//   data-original (sites often leave src empty until JavaScript runs)
// - background-image: url(...) in any element's style attribute
// - <link rel="stylesheet" href> (fetched later by the extractor)
// - <a href> for finding more pages
//
// Everything here is synchronous: the parsed document never lives across an
// .await, because scraper's Html can't be sent between threads.
// =============================================================================

use super::css;
use scraper::{Html, Selector};
use url::Url;

// Lazy-load attributes, checked on every <img> after its src
const LAZY_ATTRIBUTES: &[&str] = &["data-src", "data-lazy", "data-original"];

/// Image URLs found directly in the page, plus the stylesheets it links.
#[derive(Debug, Default)]
pub struct ImageRefs {
    pub images: Vec<Url>,
    pub stylesheets: Vec<Url>,
}

// Our selectors are constants, so a parse failure is a programmer error
fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Collects image candidates and stylesheet links, all resolved against `page_url`.
pub fn image_refs(html: &str, page_url: &Url) -> ImageRefs {
    let document = Html::parse_document(html);
    let mut refs = ImageRefs::default();

    // <img> tags: src first, then each lazy-load attribute
    for img in document.select(&selector("img")) {
        let element = img.value();
        let attributes = std::iter::once("src").chain(LAZY_ATTRIBUTES.iter().copied());

        for name in attributes {
            if let Some(url) = element.attr(name).and_then(|raw| resolve_url(page_url, raw)) {
                refs.images.push(url);
            }
        }
    }

    // Inline style="background-image: url(...)" on any element
    for styled in document.select(&selector("[style]")) {
        if let Some(style) = styled.value().attr("style") {
            for raw in css::background_image_urls(style) {
                if let Some(url) = resolve_url(page_url, raw) {
                    refs.images.push(url);
                }
            }
        }
    }

    // <link rel="stylesheet"> (rel can hold several tokens, e.g. "preload stylesheet")
    for link in document.select(&selector("link[rel][href]")) {
        let element = link.value();
        let is_stylesheet = element
            .attr("rel")
            .map(|rel| rel.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case("stylesheet")))
            .unwrap_or(false);

        if is_stylesheet {
            if let Some(url) = element.attr("href").and_then(|raw| resolve_url(page_url, raw)) {
                refs.stylesheets.push(url);
            }
        }
    }

    refs
}

/// Every `<a href>` on the page as an absolute URL, without its #fragment.
pub fn anchor_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);

    document
        .select(&selector("a[href]"))
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_url(page_url, href))
        .map(|mut url| {
            url.set_fragment(None);
            url
        })
        .collect()
}

// Resolves a possibly-relative URL to an absolute URL
//
// Examples:
//   base = "https://example.com/page/"
//   raw = "/docs" -> Some("https://example.com/docs")
//   raw = "../other" -> Some("https://example.com/other")
//   raw = "javascript:void(0)" -> None (not HTTP)
//   raw = "data:image/png;base64,..." -> None (nothing to fetch)
pub fn resolve_url(base: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let url = base.join(raw).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a Selector?
//    - A CSS selector, like in document.querySelectorAll() in JavaScript
//    - "link[rel][href]" means: <link> elements that have both attributes
//    - document.select() returns an iterator over matching elements
//
// 2. Why does resolve_url return Option?
//    - Some hrefs can't become a fetchable URL (javascript:, mailto:, data:)
//    - None lets filter_map() drop them without any special casing
//
// 3. What is std::iter::once(...).chain(...)?
//    - once() makes an iterator with a single item
//    - chain() glues a second iterator onto the end
//    - Here: "src" first, then every lazy-load attribute
//
// 4. Why `mut url` inside map()?
//    - set_fragment() changes the URL in place
//    - The closure owns each URL, so it can mutate it and hand it back
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://example.test/gallery/index.html").unwrap()
    }

    fn strings(urls: &[Url]) -> Vec<&str> {
        urls.iter().map(Url::as_str).collect()
    }

    #[test]
    fn test_img_src_is_resolved() {
        let refs = image_refs(r#"<img src="/a.png"><img src="thumbs/b.jpg">"#, &page());
        assert_eq!(
            strings(&refs.images),
            vec!["https://example.test/a.png", "https://example.test/gallery/thumbs/b.jpg"]
        );
    }

    #[test]
    fn test_lazy_src_without_src() {
        let refs = image_refs(r#"<img data-src="/lazy.jpg" alt="lazy">"#, &page());
        assert_eq!(strings(&refs.images), vec!["https://example.test/lazy.jpg"]);
    }

    #[test]
    fn test_all_lazy_attributes_are_checked() {
        let html = r#"<img src="/s.png" data-src="/1.png" data-lazy="/2.png" data-original="/3.png">"#;
        let refs = image_refs(html, &page());
        assert_eq!(
            strings(&refs.images),
            vec![
                "https://example.test/s.png",
                "https://example.test/1.png",
                "https://example.test/2.png",
                "https://example.test/3.png",
            ]
        );
    }

    #[test]
    fn test_inline_background_image() {
        let html = r#"<div style="background-image: url('/bg/hero.jpg')">Hi</div>"#;
        let refs = image_refs(html, &page());
        assert_eq!(strings(&refs.images), vec!["https://example.test/bg/hero.jpg"]);
    }

    #[test]
    fn test_stylesheets_are_collected() {
        let html = r#"
            <link rel="stylesheet" href="/css/site.css">
            <link rel="Preload Stylesheet" href="extra.css">
            <link rel="icon" href="/favicon.ico">
        "#;
        let refs = image_refs(html, &page());
        assert_eq!(
            strings(&refs.stylesheets),
            vec!["https://example.test/css/site.css", "https://example.test/gallery/extra.css"]
        );
        assert!(refs.images.is_empty());
    }

    #[test]
    fn test_skips_empty_and_data_uris() {
        let html = r#"<img src=""><img src="data:image/gif;base64,R0lGODlh"><img src="  /ok.gif ">"#;
        let refs = image_refs(html, &page());
        assert_eq!(strings(&refs.images), vec!["https://example.test/ok.gif"]);
    }

    #[test]
    fn test_anchor_links_drop_fragments_and_non_http() {
        let html = r##"
            <a href="/about#team">About</a>
            <a href="#top">Top</a>
            <a href="mailto:someone@example.test">Mail</a>
            <a href="https://other.test/">Elsewhere</a>
        "##;
        let links = anchor_links(html, &page());
        assert_eq!(
            strings(&links),
            vec![
                "https://example.test/about",
                "https://example.test/gallery/index.html",
                "https://other.test/",
            ]
        );
    }
}
