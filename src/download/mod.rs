// src/download/mod.rs
// =============================================================================
// This module saves images to disk.
//
// For every candidate image URL:
// 1. Skip it if we already saved it (no network request at all)
// 2. Skip it if robots.txt says no
// 3. GET it and make sure the server calls it an image/* (HTML error pages
//    and tracking scripts often hide behind image-looking URLs)
// 4. Pick a file name, never overwriting an existing file
// 5. Stream the body to disk
//
// Nothing in here returns an error to the caller: every failure is logged
// and reported as `false`, so one bad image never stops the crawl.
// =============================================================================

mod filename;

use crate::config::CrawlConfig;
use crate::crawl::Shutdown;
use crate::fetch::{BodyStream, Fetch};
use crate::robots::RobotsPolicy;
use anyhow::{Context, Result};
use futures::StreamExt;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};
use url::Url;

pub struct Downloader {
    fetcher: Arc<dyn Fetch>,
    policy: Arc<RobotsPolicy>,
    config: Arc<CrawlConfig>,
    /// Image URLs already saved during this run
    downloaded: HashSet<String>,
}

// How a single download attempt ended, short of an error
enum Outcome {
    /// Written to `path`, `bytes` long
    Saved { path: PathBuf, bytes: u64 },
    /// The server sent something that isn't an image
    NotAnImage,
    /// A stop was requested while the request or the write was in flight
    Interrupted,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn Fetch>, policy: Arc<RobotsPolicy>, config: Arc<CrawlConfig>) -> Self {
        Self {
            fetcher,
            policy,
            config,
            downloaded: HashSet::new(),
        }
    }

    /// Number of distinct image URLs saved so far.
    pub fn downloaded_count(&self) -> usize {
        self.downloaded.len()
    }

    /// Downloads one image. Returns true if it's on disk (now or from before).
    ///
    /// A stop request cancels the request or the write in progress; the
    /// half-written file is removed and false is returned.
    pub async fn download(&mut self, image_url: &Url, shutdown: &Shutdown) -> bool {
        if self.downloaded.contains(image_url.as_str()) {
            return true;
        }

        if !self.policy.is_allowed(image_url) {
            info!("Skipping {} - blocked by robots.txt", image_url);
            return false;
        }

        match self.fetch_and_save(image_url, shutdown).await {
            Ok(Outcome::Saved { path, bytes }) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                info!("Downloaded: {} ({} bytes)", name, bytes);
                self.downloaded.insert(image_url.to_string());
                true
            }
            Ok(Outcome::NotAnImage) => false,
            Ok(Outcome::Interrupted) => {
                warn!("Stopped downloading {} - interrupted", image_url);
                false
            }
            Err(e) => {
                error!("Failed to download {}: {:#}", image_url, e);
                false
            }
        }
    }

    async fn fetch_and_save(&self, image_url: &Url, shutdown: &Shutdown) -> Result<Outcome> {
        let response = match shutdown.unless_requested(self.fetcher.get(image_url)).await {
            Some(response) => response?.error_for_status()?,
            None => return Ok(Outcome::Interrupted),
        };

        if !response.is_image() {
            info!(
                "Skipping {} - not an image (content-type: {})",
                image_url,
                response.content_type.as_deref().unwrap_or("none")
            );
            return Ok(Outcome::NotAnImage);
        }

        let content_type = response.content_type.clone().unwrap_or_default();
        let name = filename::filename_for(image_url, &content_type, &self.config);
        let (path, file) = create_unique(&self.config.download_dir, &name).await?;

        // Don't leave half an image behind, whether the write failed or was cancelled
        match shutdown.unless_requested(write_body(file, response.body)).await {
            Some(Ok(bytes)) => Ok(Outcome::Saved { path, bytes }),
            Some(Err(e)) => {
                let _ = tokio::fs::remove_file(&path).await;
                Err(e.context(format!("Failed to save {}", path.display())))
            }
            None => {
                let _ = tokio::fs::remove_file(&path).await;
                Ok(Outcome::Interrupted)
            }
        }
    }
}

// Creates `dir/name`, or name_1, name_2, ... if taken. create_new makes the
// existence check and the creation one atomic step, so nothing is overwritten.
async fn create_unique(dir: &Path, name: &str) -> Result<(PathBuf, File)> {
    let mut counter = 0;
    loop {
        let candidate = if counter == 0 {
            name.to_string()
        } else {
            filename::numbered(name, counter)
        };
        let path = dir.join(candidate);

        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => counter += 1,
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()));
            }
        }
    }
}

async fn write_body(mut file: File, mut body: BodyStream) -> Result<u64> {
    let mut total = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("Failed to read chunk")?;
        file.write_all(&chunk).await.context("Failed to write chunk")?;
        total += chunk.len() as u64;
    }

    file.flush().await.context("Failed to flush file")?;
    Ok(total)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does create_new(true) do?
//    - Opens the file only if it doesn't exist yet, otherwise fails
//    - The OS does the check and the creation in one step
//    - So two writers can never end up with the same file
//
// 2. Why stream the body instead of reading it all?
//    - Images can be large; a stream hands us one chunk at a time
//    - Each chunk is written and dropped, so memory stays flat
//    - `while let Some(chunk) = body.next().await` reads until the end
//
// 3. What happens to a cancelled write?
//    - unless_requested drops the write_body future mid-way
//    - Dropping a future just stops it; there's no exception to catch
//    - The file is closed when it's dropped, then we remove it
//
// 4. Why `let _ = tokio::fs::remove_file(...)`?
//    - Cleanup is best effort: the real error is already being reported
//    - `let _ =` says "I know this returns a Result and I'm ignoring it"
// -----------------------------------------------------------------------------
