// src/config.rs
// =============================================================================
// The crawl configuration: everything the crawler needs to know, built once
// from the command line and never changed afterwards.
//
// The four user inputs (url, download dir, delay, page budget) get validated
// here, and the rest is derived from them: the target domain, the user agent
// and the list of file extensions we treat as images.
// =============================================================================

use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (+polite image crawler)"
);

/// The token robots.txt groups are matched against.
pub const ROBOTS_AGENT: &str = env!("CARGO_PKG_NAME");

/// Every network call (page, stylesheet, image, robots.txt) gives up after this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// File extensions we recognise as images (lowercase, with the dot).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg", ".ico", ".tiff", ".tif",
];

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed: Url,
    pub domain: Domain,
    pub download_dir: PathBuf,
    pub delay: Duration,
    pub max_pages: usize,
    pub user_agent: String,
    pub robots_agent: String,
    pub timeout: Duration,
    pub image_extensions: Vec<String>,
}

/// Scheme, host and port of the seed. Links must match all three to be followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Domain {
    pub fn of(url: &Url) -> Result<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("URL has no host: {}", url))?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_ascii_lowercase(),
            port: url.port_or_known_default(),
        })
    }

    pub fn contains(&self, url: &Url) -> bool {
        url.scheme() == self.scheme
            && url.host_str().map(|h| h.eq_ignore_ascii_case(&self.host)) == Some(true)
            && url.port_or_known_default() == self.port
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        match self.port {
            Some(443) if self.scheme == "https" => Ok(()),
            Some(80) if self.scheme == "http" => Ok(()),
            Some(port) => write!(f, ":{}", port),
            None => Ok(()),
        }
    }
}

impl CrawlConfig {
    /// Validates the raw inputs and derives everything else.
    pub fn new(
        seed: &str,
        download_dir: impl Into<PathBuf>,
        delay_secs: f64,
        max_pages: usize,
    ) -> Result<Self> {
        let seed = normalize_seed(seed)?;
        let domain = Domain::of(&seed)?;

        if !delay_secs.is_finite() || delay_secs < 0.0 {
            bail!("Delay must be a non-negative number of seconds, got {}", delay_secs);
        }

        Ok(Self {
            seed,
            domain,
            download_dir: download_dir.into(),
            delay: Duration::from_secs_f64(delay_secs),
            max_pages,
            user_agent: USER_AGENT.to_string(),
            robots_agent: ROBOTS_AGENT.to_string(),
            timeout: REQUEST_TIMEOUT,
            image_extensions: IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        })
    }

    /// True when `name` (a path or a file name) ends in one of our image extensions.
    pub fn has_image_extension(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.image_extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

// Adds https:// when the user typed a bare host like "example.com" or
// "localhost:8080", and drops any #fragment so the seed matches its links
fn normalize_seed(raw: &str) -> Result<Url> {
    let raw = raw.trim();

    // Url::parse lowercases the scheme, so "HTTPS://Example.com" works here
    let mut seed = match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        Ok(url) if raw.contains("://") => {
            bail!("Unsupported URL scheme '{}' in '{}'", url.scheme(), raw)
        }
        Err(e) if raw.contains("://") => {
            return Err(e).with_context(|| format!("Invalid URL '{}'", raw));
        }
        // "localhost:8080" parses with scheme "localhost"; treat it as a host
        _ => Url::parse(&format!("https://{}", raw))
            .with_context(|| format!("Invalid URL '{}'", raw))?,
    };

    seed.set_fragment(None);
    Ok(seed)
}
