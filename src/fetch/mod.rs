// src/fetch/mod.rs
// =============================================================================
// This module is the crawler's only door to the network.
//
// Everything that needs bytes from the web (robots.txt, pages, stylesheets,
// images) goes through the `Fetch` trait. The real implementation lives in
// http.rs and uses reqwest; tests plug in a fake one that serves canned
// responses and counts how often each URL was requested.
//
// Rust concepts:
// - Traits: A shared interface that different types can implement
// - Trait objects (dyn Fetch): Pick the implementation at runtime
// - Streams: Async iterators, used here for response bodies
// =============================================================================

mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpFetcher;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use url::Url;

/// A response body, delivered chunk by chunk.
pub type BodyStream = BoxStream<'static, Result<Bytes>>;

/// Something that can perform an HTTP GET.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &Url) -> Result<FetchResponse>;
}

/// Status line, content type and (unread) body of a GET.
pub struct FetchResponse {
    pub status: u16,
    /// Lowercased `Content-Type` header, if the server sent one
    pub content_type: Option<String>,
    pub body: BodyStream,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns 4xx/5xx into an error, like reqwest's `error_for_status`.
    pub fn error_for_status(self) -> Result<Self> {
        if !self.is_success() {
            bail!("HTTP {}", self.status);
        }
        Ok(self)
    }

    /// True when the server says this is an image (`image/...`).
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.trim_start().starts_with("image/"))
            .unwrap_or(false)
    }

    /// Reads the whole body and decodes it as (lossy) UTF-8.
    pub async fn text(mut self) -> Result<String> {
        let mut buf = Vec::new();
        while let Some(chunk) = self.body.next().await {
            buf.extend_from_slice(&chunk.context("Failed to read response body")?);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// GETs `url` and returns its body as text. Non-2xx statuses are errors.
pub async fn fetch_text(fetcher: &dyn Fetch, url: &Url) -> Result<String> {
    fetcher.get(url).await?.error_for_status()?.text().await
}
