// src/fetch/http.rs
// =============================================================================
// The real fetcher, backed by a reqwest Client.
//
// Key functionality:
// - One shared Client (connection pooling) with our user agent and timeout
// - Bodies are returned as streams so images can go straight to disk
// - Transport failures get a human-readable category for the log
//   (timeout, DNS, SSL, ...)
// =============================================================================

use super::{Fetch, FetchResponse};
use crate::config::CrawlConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        // Create an HTTP client with reasonable settings
        // We'll reuse this client for all requests (connection pooling)
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, url: &Url) -> Result<FetchResponse> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                let category = categorize_error(&e);
                return Err(anyhow::Error::new(e).context(category));
            }
        };

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        Ok(FetchResponse {
            status: response.status().as_u16(),
            content_type,
            body: response
                .bytes_stream()
                .map(|chunk| chunk.map_err(anyhow::Error::from))
                .boxed(),
        })
    }
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn categorize_error(error: &reqwest::Error) -> &'static str {
    let error_string = error.to_string().to_ascii_lowercase();

    if error.is_timeout() {
        "Request timed out"
    } else if error.is_redirect() {
        "Too many redirects"
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") {
            "Could not resolve hostname"
        } else {
            "Connection failed"
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error"
    } else {
        "Request failed"
    }
}
