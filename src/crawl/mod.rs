// src/crawl/mod.rs
// =============================================================================
// This module drives the crawl.
//
// Features:
// - Breadth-first crawling starting from the seed URL
// - Respects same-domain restriction (doesn't crawl external sites)
// - Page budget: stops after --max-pages pages
// - Polite crawling with a delay between pages
// - Stops promptly when the user presses Ctrl-C, cancelling requests in flight
//
// Rust concepts:
// - Collections: HashSet for tracking visited URLs, VecDeque for the queue
// - Channels: tokio's watch channel carries the "please stop" flag
// =============================================================================

mod scheduler;

pub use scheduler::Crawler;

use std::future::Future;
use std::path::PathBuf;
use tokio::sync::watch;

/// What a finished (or interrupted) crawl did.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSummary {
    pub pages_crawled: usize,
    pub images_downloaded: usize,
    pub download_dir: PathBuf,
    pub interrupted: bool,
}

/// Sending half of the stop flag. Call `trigger` to ask the crawl to stop.
pub struct ShutdownTrigger(watch::Sender<bool>);

/// Receiving half of the stop flag, checked between steps and raced against requests.
#[derive(Clone)]
pub struct Shutdown(watch::Receiver<bool>);

pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger(tx), Shutdown(rx))
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        // send_replace works even if every receiver is gone
        self.0.send_replace(true);
    }
}

impl Shutdown {
    /// A flag nobody can ever raise.
    #[cfg(test)]
    pub fn never() -> Self {
        shutdown_channel().1
    }

    pub fn is_requested(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once a stop was requested. Never resolves if the trigger was
    /// dropped without firing.
    pub async fn requested(&mut self) {
        if self.0.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Runs `work` to completion, or drops it as soon as a stop is requested.
    ///
    /// Returns `None` when the stop won. Any network request inside `work` is
    /// cancelled with it.
    pub async fn unless_requested<F: Future>(&self, work: F) -> Option<F::Output> {
        if self.is_requested() {
            return None;
        }

        let mut stop = self.clone();
        tokio::select! {
            output = work => Some(output),
            _ = stop.requested() => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_is_seen_by_receiver() {
        let (trigger, mut shutdown) = shutdown_channel();
        assert!(!shutdown.is_requested());

        trigger.trigger();
        assert!(shutdown.is_requested());
        tokio::time::timeout(Duration::from_secs(1), shutdown.requested())
            .await
            .expect("stop request should resolve");
    }

    #[tokio::test]
    async fn test_never_stays_quiet() {
        let mut shutdown = Shutdown::never();
        assert!(!shutdown.is_requested());
        let waited = tokio::time::timeout(Duration::from_millis(20), shutdown.requested()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_unless_requested_lets_work_finish() {
        let shutdown = Shutdown::never();
        assert_eq!(shutdown.unless_requested(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn test_unless_requested_cancels_hanging_work() {
        let (trigger, shutdown) = shutdown_channel();
        let hanging = std::future::pending::<()>();

        let stopper = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.trigger();
        };
        let (outcome, ()) = tokio::time::timeout(Duration::from_secs(1), async {
            tokio::join!(shutdown.unless_requested(hanging), stopper)
        })
        .await
        .expect("a stop request should cancel the work");

        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn test_unless_requested_skips_work_after_stop() {
        let (trigger, shutdown) = shutdown_channel();
        trigger.trigger();

        let mut ran = false;
        let outcome = shutdown.unless_requested(async { ran = true }).await;
        assert_eq!(outcome, None);
        assert!(!ran);
    }
}
