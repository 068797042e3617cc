// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (terminal + crawler.log)
// 3. Build the crawler (creates the download directory, reads robots.txt)
// 4. Crawl until done, or until the user presses Ctrl-C
// 5. Print a summary and exit (0 = crawl ran, 1 = could not start,
//    130 = Ctrl-C pressed twice)
//
// Rust concepts used:
// - async/await: Network requests and polite sleeps without blocking a thread
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Arc: Shared ownership of the HTTP client between crawler parts
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;       // src/cli.rs - command-line parsing
mod config;    // src/config.rs - validated crawl settings
mod crawl;     // src/crawl/ - the crawl loop
mod download;  // src/download/ - saving images to disk
mod extract;   // src/extract/ - finding images and links in pages
mod fetch;     // src/fetch/ - HTTP requests
mod robots;    // src/robots.rs - robots.txt rules

use anyhow::Result;
use clap::Parser; // Parser trait enables the parse() method
use cli::Cli;
use config::CrawlConfig;
use crawl::{shutdown_channel, CrawlSummary, Crawler};
use fetch::HttpFetcher;
use std::sync::{Arc, Mutex};
use tracing::{error, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

// Every log line also goes here, next to wherever the crawler was started
const LOG_FILE: &str = "crawler.log";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            // Only start-up problems end up here; crawl errors are logged and skipped
            error!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    let config = CrawlConfig::new(&cli.url, &cli.download_dir, cli.delay, cli.max_pages)?;
    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    let mut crawler = Crawler::new(config, fetcher).await?;

    // The first Ctrl-C raises a flag: in-flight requests are dropped, partial
    // files removed and the summary printed. A second one exits right away.
    let (trigger, shutdown) = shutdown_channel();
    tokio::spawn(async move {
        let mut presses = 0;
        while tokio::signal::ctrl_c().await.is_ok() {
            presses += 1;
            if presses == 1 {
                warn!("Interrupt received, stopping... (press Ctrl-C again to quit now)");
                trigger.trigger();
            } else {
                warn!("Second interrupt, exiting immediately");
                std::process::exit(130);
            }
        }
    });

    let summary = crawler.crawl(shutdown).await;
    print_summary(&summary);

    Ok(())
}

// Logs go to stderr and crawler.log; RUST_LOG overrides the default level
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("image_crawler=info,warn"));

    let file_layer = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)
    {
        Ok(file) => Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
        Err(e) => {
            eprintln!("Warning: could not open {}: {}", LOG_FILE, e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
}

fn print_summary(summary: &CrawlSummary) {
    println!();
    if summary.interrupted {
        println!("⏹️  Crawl interrupted");
    } else {
        println!("✅ Crawl complete");
    }
    println!("📊 Summary:");
    println!("   📄 Pages crawled: {}", summary.pages_crawled);
    println!("   🖼️  Images downloaded: {}", summary.images_downloaded);
    println!("   📁 Saved to: {}", summary.download_dir.display());
}
