//! Crawler coordinator - one site's crawl loop
//!
//! This module contains the loop that drives a single site's crawl:
//! - Taking windows of URLs from the scheduler
//! - Fetching each window concurrently under per-host politeness
//! - Cleaning fetched pages into heading segments
//! - Handing pages to the extraction stage as they are produced
//! - Stopping on page limit, time budget or cancellation

use crate::cleaner::{Cleaner, Segment};
use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::scheduler::{ScheduledFetch, Scheduler};
use crate::output::{PageError, StopReason};
use crate::state::{HostThrottle, PageState};
use crate::url::extract_domain;
use crate::FetchError;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A fetched and cleaned page, ready for candidate extraction
#[derive(Debug, Clone)]
pub struct Page {
    /// The URL that was requested (normalized)
    pub url: Url,

    /// URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status: u16,

    /// Link distance from the seed
    pub depth: u32,

    /// Breadth-first order index; the seed is 0
    pub order: usize,

    /// Outgoing links found on the page
    pub links: Vec<String>,

    /// Cleaned heading segments, in document order
    pub segments: Vec<Segment>,

    /// Processed, or Malformed when cleaning failed
    pub state: PageState,
}

/// What a finished site crawl reports back
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Pages fetched successfully (including pages that failed cleaning)
    pub pages_visited: usize,

    /// Pages that failed to fetch or were abandoned
    pub pages_skipped: usize,

    /// Per-page failures, in the order they were recorded
    pub errors: Vec<PageError>,

    /// Why the crawl stopped
    pub stop_reason: StopReason,
}

impl CrawlReport {
    /// Whether the crawl ended before its natural end
    pub fn truncated(&self) -> bool {
        self.stop_reason.is_truncated()
    }
}

/// Main crawler coordinator structure
///
/// One coordinator serves one site. It owns the scheduler for the duration
/// of `run`, so the frontier and visited-set are only ever mutated from the
/// crawl loop.
pub struct Coordinator {
    config: CrawlerConfig,
    fetcher: Arc<dyn Fetcher>,
    cleaner: Arc<Cleaner>,
    throttle: HostThrottle,
}

impl Coordinator {
    /// Creates a new coordinator
    pub fn new(config: CrawlerConfig, fetcher: Arc<dyn Fetcher>, cleaner: Arc<Cleaner>) -> Self {
        let throttle = HostThrottle::new(Duration::from_millis(config.politeness_delay_ms));

        Self {
            config,
            fetcher,
            cleaner,
            throttle,
        }
    }

    /// Runs the crawl loop for one site
    ///
    /// Pages are sent on `pages` as soon as they are cleaned, in breadth-first
    /// order. The loop ends when the frontier is empty, the page budget is
    /// spent, the site budget elapses or `cancel` fires. A window interrupted
    /// by the budget or cancellation contributes no pages, and a full channel
    /// never holds the loop past either.
    pub async fn run(
        &self,
        seed: Url,
        pages: mpsc::Sender<Page>,
        cancel: CancellationToken,
    ) -> CrawlReport {
        let deadline =
            tokio::time::Instant::now() + Duration::from_millis(self.config.site_budget_ms);
        let mut scheduler = Scheduler::new(self.config.clone(), seed.clone());

        let mut report = CrawlReport {
            pages_visited: 0,
            pages_skipped: 0,
            errors: Vec::new(),
            stop_reason: StopReason::Completed,
        };

        tracing::info!("Starting crawl of {}", seed);

        'crawl: loop {
            if cancel.is_cancelled() {
                report.stop_reason = StopReason::Cancelled;
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                report.stop_reason = StopReason::TimeBudget;
                break;
            }

            let window = scheduler.next_batch();
            if window.is_empty() {
                if scheduler.page_limit_reached() && !scheduler.is_empty() {
                    report.stop_reason = StopReason::PageLimit;
                }
                break;
            }

            tracing::debug!(
                "Fetching window of {} URLs ({} still queued)",
                window.len(),
                scheduler.frontier_size()
            );

            let fetches = window.iter().map(|fetch| self.fetch_page(&fetch.url.url));
            let results = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.stop_reason = StopReason::Cancelled;
                    break 'crawl;
                }
                _ = tokio::time::sleep_until(deadline) => {
                    report.stop_reason = StopReason::TimeBudget;
                    break 'crawl;
                }
                results = join_all(fetches) => results,
            };

            for (fetch, result) in window.into_iter().zip(results) {
                match result {
                    Ok(fetched) => {
                        if !scheduler.claim_final_url(&fetch.url.url, &fetched.final_url) {
                            tracing::debug!(
                                "Dropping {}: redirected to already seen {}",
                                fetch.url.url,
                                fetched.final_url
                            );
                            continue;
                        }

                        scheduler.record_success(&fetch);
                        let page = self.process_page(&mut scheduler, fetch, fetched, &mut report);
                        report.pages_visited += 1;

                        let sent = tokio::select! {
                            biased;
                            _ = cancel.cancelled() => {
                                report.stop_reason = StopReason::Cancelled;
                                break 'crawl;
                            }
                            _ = tokio::time::sleep_until(deadline) => {
                                report.stop_reason = StopReason::TimeBudget;
                                break 'crawl;
                            }
                            sent = pages.send(page) => sent,
                        };
                        if sent.is_err() {
                            tracing::debug!("Page receiver dropped, continuing crawl");
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Skipping {}: {}", fetch.url.url, e);
                        report.pages_skipped += 1;
                        report.errors.push(PageError {
                            url: fetch.url.url.to_string(),
                            state: e.state(),
                            reason: e.to_string(),
                        });

                        if fetch.order == 0 {
                            report.stop_reason = StopReason::SeedUnreachable;
                            break 'crawl;
                        }

                        for abandoned in scheduler.record_failure(&fetch) {
                            report.pages_skipped += 1;
                            report.errors.push(PageError {
                                url: abandoned.url.to_string(),
                                state: PageState::BranchAbandoned,
                                reason: format!(
                                    "Branch abandoned after {} consecutive failures",
                                    self.config.max_consecutive_failures
                                ),
                            });
                        }
                    }
                }
            }
        }

        tracing::info!(
            "Crawl of {} finished: {} visited, {} skipped, stop reason {}",
            seed,
            report.pages_visited,
            report.pages_skipped,
            report.stop_reason
        );

        report
    }

    /// Fetches one URL under politeness and the per-request timeout
    ///
    /// The timeout is enforced here as well as passed down, so a fetcher that
    /// ignores it still cannot stall the window.
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let host = extract_domain(url).unwrap_or_default();
        self.throttle.acquire(&host).await;

        let timeout = Duration::from_millis(self.config.request_timeout_ms);
        match tokio::time::timeout(timeout, self.fetcher.fetch(url, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    /// Turns a fetched page into a `Page`, queueing its links
    fn process_page(
        &self,
        scheduler: &mut Scheduler,
        fetch: ScheduledFetch,
        fetched: FetchedPage,
        report: &mut CrawlReport,
    ) -> Page {
        let queued = scheduler.enqueue_links(&fetch, &fetched.links);
        tracing::debug!(
            "Processed {} (depth {}): {} links, {} queued",
            fetch.url.url,
            fetch.url.depth,
            fetched.links.len(),
            queued
        );

        let (segments, state) = match self.cleaner.clean(&fetched.content) {
            Ok(segments) => (segments, PageState::Processed),
            Err(e) => {
                tracing::warn!("Could not clean {}: {}", fetch.url.url, e);
                report.errors.push(PageError {
                    url: fetch.url.url.to_string(),
                    state: PageState::Malformed,
                    reason: e.to_string(),
                });
                (Vec::new(), PageState::Malformed)
            }
        };

        Page {
            url: fetch.url.url,
            final_url: fetched.final_url,
            status: fetched.status,
            depth: fetch.url.depth,
            order: fetch.order,
            links: fetched.links,
            segments,
            state,
        }
    }
}
