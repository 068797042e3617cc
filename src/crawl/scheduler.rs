// src/crawl/scheduler.rs
// =============================================================================
// This module implements the crawl loop with a breadth-first approach.
//
// How it works:
// 1. Start with the seed URL in a queue (the "frontier")
// 2. Pop the next URL; skip it if visited or blocked by robots.txt
// 3. Fetch the page once, download its images
// 4. Add up to 10 same-domain links to the back of the queue
// 5. Mark the page visited, wait politely, repeat
// 6. Stop when the queue is empty, the page budget is used up, or the user
//    pressed Ctrl-C
//
// The queue may briefly hold the same URL twice (two pages link to it);
// the visited check at the top of the loop makes sure it's processed once.
// =============================================================================

use super::{CrawlSummary, Shutdown};
use crate::config::CrawlConfig;
use crate::download::Downloader;
use crate::extract::Extractor;
use crate::fetch::{fetch_text, Fetch};
use crate::robots::RobotsPolicy;
use anyhow::{Context, Result};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

/// New links taken from a single page, so link-heavy pages can't flood the queue.
const MAX_NEW_LINKS_PER_PAGE: usize = 10;

pub struct Crawler {
    config: Arc<CrawlConfig>,
    fetcher: Arc<dyn Fetch>,
    policy: Arc<RobotsPolicy>,
    extractor: Extractor,
    downloader: Downloader,
    frontier: VecDeque<Url>,
    visited: HashSet<String>,
    pages_crawled: usize,
}

impl Crawler {
    /// Creates the download directory and loads robots.txt.
    ///
    /// Failing to create the directory is the only error; robots.txt
    /// problems just mean everything is allowed.
    pub async fn new(config: CrawlConfig, fetcher: Arc<dyn Fetch>) -> Result<Self> {
        tokio::fs::create_dir_all(&config.download_dir)
            .await
            .with_context(|| {
                format!("Failed to create download directory {}", config.download_dir.display())
            })?;

        let config = Arc::new(config);
        let policy = Arc::new(
            RobotsPolicy::load(fetcher.as_ref(), &config.seed, &config.robots_agent).await,
        );

        info!("Initialized crawler for {}", config.seed);
        info!("Download directory: {}", config.download_dir.display());
        info!("Delay between requests: {:?}", config.delay);
        info!("Page budget: {}", config.max_pages);

        Ok(Self {
            extractor: Extractor::new(fetcher.clone(), config.clone()),
            downloader: Downloader::new(fetcher.clone(), policy.clone(), config.clone()),
            frontier: VecDeque::from([config.seed.clone()]),
            visited: HashSet::new(),
            pages_crawled: 0,
            config,
            fetcher,
            policy,
        })
    }

    /// Runs until the frontier is empty, the page budget is spent, or
    /// `shutdown` fires.
    pub async fn crawl(&mut self, mut shutdown: Shutdown) -> CrawlSummary {
        info!("Starting website crawl...");
        let mut interrupted = false;

        while self.pages_crawled < self.config.max_pages {
            if shutdown.is_requested() {
                interrupted = true;
                break;
            }

            // Process the queue until empty
            let Some(current) = self.frontier.pop_front() else {
                break;
            };

            // Skip if already visited
            if self.visited.contains(current.as_str()) {
                continue;
            }

            if !self.policy.is_allowed(&current) {
                info!("Skipping {} - blocked by robots.txt", current);
                continue;
            }

            info!(
                "Crawling page {}/{}: {}",
                self.pages_crawled + 1,
                self.config.max_pages,
                current
            );

            match self.process_page(&current, &shutdown).await {
                PageOutcome::Done => {}
                PageOutcome::StoppedPartway => interrupted = true,
                // The page never arrived, so it doesn't use up the budget
                PageOutcome::NotFetched => {
                    interrupted = true;
                    break;
                }
            }

            self.visited.insert(current.to_string());
            self.pages_crawled += 1;

            if interrupted {
                break;
            }

            // Polite crawling: wait before the next page, unless told to stop
            tokio::select! {
                _ = tokio::time::sleep(self.config.delay) => {}
                _ = shutdown.requested() => {
                    interrupted = true;
                    break;
                }
            }
        }

        if interrupted {
            info!("Crawling interrupted by user.");
        } else {
            info!("Crawling completed!");
        }

        let summary = CrawlSummary {
            pages_crawled: self.pages_crawled,
            images_downloaded: self.downloader.downloaded_count(),
            download_dir: self.config.download_dir.clone(),
            interrupted,
        };

        info!("Pages crawled: {}", summary.pages_crawled);
        info!("Images downloaded: {}", summary.images_downloaded);
        info!("Download directory: {}", summary.download_dir.display());

        summary
    }

    // Downloads the page's images and queues its links
    async fn process_page(&mut self, page_url: &Url, shutdown: &Shutdown) -> PageOutcome {
        let fetched = shutdown
            .unless_requested(fetch_text(self.fetcher.as_ref(), page_url))
            .await;

        // A page we can't fetch counts as a page with nothing on it
        let body = match fetched {
            None => return PageOutcome::NotFetched,
            Some(Ok(body)) => body,
            Some(Err(e)) => {
                error!("Failed to fetch {}: {:#}", page_url, e);
                String::new()
            }
        };

        let images = self.extractor.extract_images(page_url, &body, shutdown).await;
        let mut images_downloaded = 0;

        for image_url in &images {
            if shutdown.is_requested() {
                return PageOutcome::StoppedPartway;
            }
            if self.downloader.download(image_url, shutdown).await {
                images_downloaded += 1;
            }
        }

        info!("Downloaded {} images from {}", images_downloaded, page_url);
        if shutdown.is_requested() {
            return PageOutcome::StoppedPartway;
        }

        // The last page in the budget doesn't need links: nobody will visit them
        if self.pages_crawled + 1 < self.config.max_pages {
            let links = self.extractor.extract_links(page_url, &body, &self.visited);
            self.frontier
                .extend(links.into_iter().take(MAX_NEW_LINKS_PER_PAGE));
        }

        PageOutcome::Done
    }
}

enum PageOutcome {
    Done,
    /// Stopped after the page was fetched; it still counts as crawled
    StoppedPartway,
    /// Stopped while the page itself was loading
    NotFetched,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is let-else?
//    - let Some(current) = self.frontier.pop_front() else { break; };
//    - If the pattern matches, `current` is bound for the rest of the loop
//    - If not, the else block runs and must leave (break, continue, return)
//    - One less level of nesting than match or if let
//
// 2. Why VecDeque for the frontier?
//    - extend() appends to the back, pop_front() takes from the front
//    - Both are O(1), which is what breadth-first order needs
//
// 3. What does tokio::select! do?
//    - Waits on several futures at once
//    - Runs the branch of whichever finishes first
//    - The other futures are dropped, which cancels them
//    - That's how the polite sleep ends early on Ctrl-C
//
// 4. Why return an enum instead of a bool?
//    - "stopped" can mean two things here: the page was fetched or it wasn't
//    - Only a fetched page counts toward the budget
//    - The compiler makes the loop handle every variant
// -----------------------------------------------------------------------------
