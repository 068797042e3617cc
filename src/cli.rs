// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The crawler has exactly four knobs:
// - the seed URL to start from
// - where to save the images
// - how long to wait between pages
// - how many pages to crawl at most
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::Parser;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "image-crawler",
    version,
    about = "A polite crawler that downloads every image on a website",
    long_about = "image-crawler walks a website breadth-first, starting from a seed URL, and \
                  downloads every image it finds. It stays on the seed's domain, obeys \
                  robots.txt and waits between pages so it doesn't hammer the server."
)]
pub struct Cli {
    /// Website URL to start crawling from (e.g., https://example.com)
    ///
    /// If no scheme is given, https:// is assumed
    pub url: String,

    /// Directory to save downloaded images (created if missing)
    #[arg(short = 'd', long, default_value = "downloaded_images")]
    pub download_dir: String,

    /// Delay between pages in seconds
    #[arg(long, default_value_t = 1.0)]
    pub delay: f64,

    /// Maximum number of pages to crawl
    #[arg(long, default_value_t = 100)]
    pub max_pages: usize,
}
