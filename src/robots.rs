// src/robots.rs
// =============================================================================
// This module decides whether we're allowed to fetch a URL, according to the
// seed site's robots.txt.
//
// How it works:
// 1. At startup we fetch <scheme>://<host>/robots.txt exactly once
// 2. The body is kept in memory for the rest of the run
// 3. Every page and image URL is checked against it before we request it
//
// Failure policy: if robots.txt can't be fetched we log a warning and allow
// everything (fail-open). A flaky robots.txt must not stop the whole crawl.
// The exception is 401/403, which sites use to say "keep out entirely".
//
// Matching is done by the `robotstxt` crate (a port of Google's matcher).
// =============================================================================

use crate::fetch::Fetch;
use robotstxt::DefaultMatcher;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    agent: String,
    rules: Rules,
}

#[derive(Debug, Clone)]
enum Rules {
    /// No usable robots.txt; everything is allowed
    AllowAll,
    /// The server refused us robots.txt itself (401/403)
    DisallowAll,
    /// The robots.txt body
    Parsed(String),
}

impl RobotsPolicy {
    /// Fetches and caches robots.txt for the seed's host. Never fails.
    pub async fn load(fetcher: &dyn Fetch, seed: &Url, agent: &str) -> Self {
        let robots_url = match seed.join("/robots.txt") {
            Ok(url) => url,
            Err(e) => {
                warn!("Could not build robots.txt URL for {}: {}", seed, e);
                return Self::allow_all(agent);
            }
        };

        let response = match fetcher.get(&robots_url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Could not load robots.txt from {}: {:#}", robots_url, e);
                return Self::allow_all(agent);
            }
        };

        let rules = match response.status {
            401 | 403 => {
                warn!("robots.txt at {} returned HTTP {}; treating the whole site as disallowed", robots_url, response.status);
                Rules::DisallowAll
            }
            status if !(200..300).contains(&status) => {
                info!("No robots.txt at {} (HTTP {}); everything is allowed", robots_url, status);
                Rules::AllowAll
            }
            _ => match response.text().await {
                Ok(body) => {
                    info!("Loaded robots.txt from {}", robots_url);
                    Rules::Parsed(body)
                }
                Err(e) => {
                    warn!("Could not read robots.txt from {}: {:#}", robots_url, e);
                    Rules::AllowAll
                }
            },
        };

        Self {
            agent: agent.to_string(),
            rules,
        }
    }

    pub fn allow_all(agent: &str) -> Self {
        Self {
            agent: agent.to_string(),
            rules: Rules::AllowAll,
        }
    }

    #[cfg(test)]
    pub fn from_body(agent: &str, body: &str) -> Self {
        Self {
            agent: agent.to_string(),
            rules: Rules::Parsed(body.to_string()),
        }
    }

    pub fn is_allowed(&self, url: &Url) -> bool {
        match &self.rules {
            Rules::AllowAll => true,
            Rules::DisallowAll => false,
            Rules::Parsed(body) => {
                // The matcher is third-party code running on untrusted input.
                // If it blows up, allow the URL instead of killing the crawl.
                let verdict = catch_quietly(|| {
                    DefaultMatcher::default().one_agent_allowed_by_robots(
                        body,
                        &self.agent,
                        url.as_str(),
                    )
                });

                verdict.unwrap_or_else(|| {
                    debug!("robots.txt evaluation failed for {}; allowing", url);
                    true
                })
            }
        }
    }
}

// Runs `f`, turning a panic into None without printing the panic message.
// The default hook would write "thread panicked at ..." to stderr for every
// URL checked against a robots.txt the matcher chokes on.
fn catch_quietly<T>(f: impl FnOnce() -> T) -> Option<T> {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    panic::set_hook(previous);
    result.ok()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is catch_unwind?
//    - Runs a closure and stops a panic inside it from unwinding further
//    - Returns Ok(value) normally, Err(payload) if the closure panicked
//    - It's not a try/catch for errors: Result is still the normal way
//
// 2. Why AssertUnwindSafe?
//    - catch_unwind only accepts closures the compiler considers "unwind safe"
//    - Borrowing &self makes the closure not qualify automatically
//    - We only read from self, so nothing can be left half-updated
//
// 3. What is the panic hook?
//    - A global function Rust calls when a panic starts, before unwinding
//    - The default one prints the message and location to stderr
//    - take_hook() removes it, set_hook() installs a replacement
//
// 4. Why keep the body as a String instead of parsing it once?
//    - robotstxt's matcher parses and matches in one call
//    - robots.txt files are small, so re-reading them per URL is cheap
// -----------------------------------------------------------------------------
