// src/fetch/mock.rs
// =============================================================================
// A fake fetcher for tests: serves canned responses from a map and counts how
// many times each URL was requested. URLs without a route behave like a host
// that refuses connections.
// =============================================================================

use super::{Fetch, FetchResponse};
use crate::crawl::ShutdownTrigger;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

#[derive(Clone)]
enum Route {
    Respond {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    },
    Fail(String),
    /// Never answers, like a server that accepted the connection and went quiet
    Hang,
    /// Answers 200, sends one chunk of the body, then goes quiet
    Stall {
        content_type: String,
        first_chunk: Vec<u8>,
    },
}

#[derive(Default)]
pub struct MockFetcher {
    routes: HashMap<String, Route>,
    hits: Mutex<HashMap<String, usize>>,
    triggers: HashMap<String, ShutdownTrigger>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, status: u16, content_type: Option<&str>, body: &[u8]) -> Self {
        self.routes.insert(
            key(url),
            Route::Respond {
                status,
                content_type: content_type.map(str::to_string),
                body: body.to_vec(),
            },
        );
        self
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.respond(url, 200, Some("text/html; charset=utf-8"), html.as_bytes())
    }

    pub fn css(self, url: &str, css: &str) -> Self {
        self.respond(url, 200, Some("text/css"), css.as_bytes())
    }

    pub fn image(self, url: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.respond(url, 200, Some(content_type), bytes)
    }

    pub fn fail(mut self, url: &str, reason: &str) -> Self {
        self.routes.insert(key(url), Route::Fail(reason.to_string()));
        self
    }

    pub fn hang(mut self, url: &str) -> Self {
        self.routes.insert(key(url), Route::Hang);
        self
    }

    pub fn stall_after_first_chunk(mut self, url: &str, content_type: &str, first_chunk: &[u8]) -> Self {
        self.routes.insert(
            key(url),
            Route::Stall {
                content_type: content_type.to_string(),
                first_chunk: first_chunk.to_vec(),
            },
        );
        self
    }

    /// Fires `trigger` whenever `url` is requested, before answering.
    pub fn stop_when_requested(mut self, url: &str, trigger: ShutdownTrigger) -> Self {
        self.triggers.insert(key(url), trigger);
        self
    }

    /// How many times `url` was requested.
    pub fn hits(&self, url: &str) -> usize {
        let hits = self.hits.lock().unwrap();
        hits.get(&key(url)).copied().unwrap_or(0)
    }
}

// Normalises through Url so "https://a.test" and "https://a.test/" are the same route
fn key(url: &str) -> String {
    Url::parse(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl Fetch for MockFetcher {
    async fn get(&self, url: &Url) -> Result<FetchResponse> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;
        if let Some(trigger) = self.triggers.get(url.as_str()) {
            trigger.trigger();
        }

        match self.routes.get(url.as_str()).cloned() {
            Some(Route::Respond { status, content_type, body }) => Ok(FetchResponse {
                status,
                content_type,
                body: stream::once(async move { Ok(Bytes::from(body)) }).boxed(),
            }),
            Some(Route::Fail(reason)) => Err(anyhow!(reason)),
            Some(Route::Hang) => std::future::pending().await,
            Some(Route::Stall { content_type, first_chunk }) => Ok(FetchResponse {
                status: 200,
                content_type: Some(content_type),
                body: stream::once(async move { Ok(Bytes::from(first_chunk)) })
                    .chain(stream::pending())
                    .boxed(),
            }),
            None => Err(anyhow!("Connection refused: {}", url)),
        }
    }
}
