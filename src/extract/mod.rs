// src/extract/mod.rs
// =============================================================================
// The extractor turns a fetched page into two lists:
// - image URLs to download
// - same-domain page URLs to crawl next
//
// Submodules:
// - html: Parses the page and collects raw references
// - css: Finds url(...) references in CSS and decides what looks like an image
//
// The page body is fetched once by the scheduler and handed to both
// operations. Only linked stylesheets cause extra requests from here.
// =============================================================================

mod css;
mod html;

use crate::config::CrawlConfig;
use crate::crawl::Shutdown;
use crate::fetch::{fetch_text, Fetch};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

pub struct Extractor {
    fetcher: Arc<dyn Fetch>,
    config: Arc<CrawlConfig>,
}

impl Extractor {
    pub fn new(fetcher: Arc<dyn Fetch>, config: Arc<CrawlConfig>) -> Self {
        Self { fetcher, config }
    }

    /// Image candidates on the page, in this order: `<img>` src and lazy-load
    /// attributes, inline `background-image` styles, then images referenced
    /// by linked stylesheets.
    ///
    /// A stylesheet that fails to load is logged and skipped. Once a stop is
    /// requested, no further stylesheets are fetched and the images found so
    /// far are returned.
    pub async fn extract_images(&self, page_url: &Url, body: &str, shutdown: &Shutdown) -> Vec<Url> {
        let html::ImageRefs { mut images, stylesheets } = html::image_refs(body, page_url);

        for css_url in stylesheets {
            let fetched = shutdown
                .unless_requested(fetch_text(self.fetcher.as_ref(), &css_url))
                .await;

            let css = match fetched {
                Some(Ok(css)) => css,
                None => {
                    debug!("Stop requested, skipping remaining stylesheets on {}", page_url);
                    break;
                }
                Some(Err(e)) => {
                    warn!("Could not fetch CSS file {}: {:#}", css_url, e);
                    continue;
                }
            };

            // url(...) in a stylesheet is relative to the stylesheet, not the page
            let before = images.len();
            images.extend(
                css::url_references(&css)
                    .into_iter()
                    .filter_map(|raw| html::resolve_url(&css_url, raw))
                    .filter(|url| css::is_image_url(url, &self.config)),
            );
            debug!("{} image(s) referenced by {}", images.len() - before, css_url);
        }

        images
    }

    /// Same-domain links on the page that haven't been visited yet.
    pub fn extract_links(&self, page_url: &Url, body: &str, visited: &HashSet<String>) -> Vec<Url> {
        html::anchor_links(body, page_url)
            .into_iter()
            .filter(|url| self.config.domain.contains(url))
            .filter(|url| !visited.contains(url.as_str()))
            .collect()
    }
}
