//! Scheduler for managing one site's crawl frontier
//!
//! This module handles:
//! - The FIFO frontier of URLs to crawl, seeded with the site URL at depth 0
//! - The visited-set keyed by normalized URL
//! - Depth and host-scope limits on expansion
//! - The page budget, spent only by successful fetches
//! - Abandoning the rest of a page's children after repeated failures
//!
//! The scheduler is owned by a single crawl loop; fetch futures never touch it.

use crate::config::CrawlerConfig;
use crate::url::{extract_domain, is_in_scope, normalize_url, visit_key};
use std::collections::{HashMap, HashSet, VecDeque};
use url::Url;

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The normalized URL to fetch
    pub url: Url,

    /// Link distance from the seed
    pub depth: u32,

    /// Order index of the page this URL was discovered on (None for the seed)
    pub parent: Option<usize>,
}

/// A URL handed out for fetching, with its breadth-first order index
#[derive(Debug, Clone)]
pub struct ScheduledFetch {
    /// Position of this page in the crawl, starting at 0 for the seed
    pub order: usize,

    pub url: QueuedUrl,
}

/// Scheduler manages the frontier queue and the visited-set
///
/// The scheduler coordinates:
/// - Breadth-first ordering (plain FIFO, first-seen wins)
/// - Deduplication on normalized URLs
/// - The per-site page budget (successful fetches only)
/// - Per-parent failure streaks
pub struct Scheduler {
    /// URLs to fetch, in discovery order
    frontier: VecDeque<QueuedUrl>,

    /// Visit keys of URLs that were queued or fetched
    visited: HashSet<String>,

    /// Host of the seed URL, used for scope checks
    seed_host: String,

    /// Number of URLs handed out for fetching
    dispatched: usize,

    /// Number of successful fetches
    pages_visited: usize,

    /// Consecutive failed children per parent page
    failure_streaks: HashMap<usize, u32>,

    /// Parents whose remaining children were dropped
    abandoned_parents: HashSet<usize>,

    /// Crawler configuration
    config: CrawlerConfig,
}

impl Scheduler {
    /// Creates a scheduler whose frontier holds only the seed
    pub fn new(config: CrawlerConfig, seed: Url) -> Self {
        let seed_host = extract_domain(&seed).unwrap_or_default();

        let mut visited = HashSet::new();
        visited.insert(visit_key(&seed));

        let mut frontier = VecDeque::new();
        frontier.push_back(QueuedUrl {
            url: seed,
            depth: 0,
            parent: None,
        });

        Self {
            frontier,
            visited,
            seed_host,
            dispatched: 0,
            pages_visited: 0,
            failure_streaks: HashMap::new(),
            abandoned_parents: HashSet::new(),
            config,
        }
    }

    /// Takes the next window of URLs to fetch
    ///
    /// The window holds at most `max_concurrent_fetches` URLs and never goes
    /// past the remaining page budget. The caller records every fetch of a
    /// window before taking the next one, so successful visits can never
    /// exceed the budget. URLs come out in FIFO order and each receives the
    /// next order index.
    pub fn next_batch(&mut self) -> Vec<ScheduledFetch> {
        let window = (self.config.max_concurrent_fetches.max(1) as usize)
            .min(self.remaining_pages());

        let mut batch = Vec::with_capacity(window);
        while batch.len() < window {
            let Some(url) = self.frontier.pop_front() else {
                break;
            };

            batch.push(ScheduledFetch {
                order: self.dispatched,
                url,
            });
            self.dispatched += 1;
        }

        batch
    }

    /// Adds links discovered on a page to the frontier
    ///
    /// Links are dropped when the page already sits at the maximum depth, when
    /// they fail to normalize, leave the site's scope, or were seen before.
    /// Returns the number of URLs queued.
    pub fn enqueue_links(&mut self, from: &ScheduledFetch, links: &[String]) -> usize {
        if from.url.depth >= self.config.max_depth {
            return 0;
        }

        let mut queued = 0;
        for link in links {
            let normalized = match normalize_url(link) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Skipping link {}: {}", link, e);
                    continue;
                }
            };

            let host = extract_domain(&normalized).unwrap_or_default();
            if !is_in_scope(&host, &self.seed_host, &self.config.allowed_domains) {
                tracing::trace!("Out of scope: {}", normalized);
                continue;
            }

            if !self.visited.insert(visit_key(&normalized)) {
                continue;
            }

            self.frontier.push_back(QueuedUrl {
                url: normalized,
                depth: from.url.depth + 1,
                parent: Some(from.order),
            });
            queued += 1;
        }

        queued
    }

    /// Claims the URL a fetch ended on after redirects
    ///
    /// Returns false when a redirect landed on a page already queued or
    /// fetched under another URL; that page is a duplicate and must be
    /// dropped.
    pub fn claim_final_url(&mut self, requested: &Url, final_url: &Url) -> bool {
        let Ok(normalized) = normalize_url(final_url.as_str()) else {
            return true;
        };

        let key = visit_key(&normalized);
        key == visit_key(requested) || self.visited.insert(key)
    }

    /// Records a successful fetch
    ///
    /// Spends one page of the budget and resets the parent's failure streak.
    pub fn record_success(&mut self, fetch: &ScheduledFetch) {
        self.pages_visited += 1;
        if let Some(parent) = fetch.url.parent {
            self.failure_streaks.insert(parent, 0);
        }
    }

    /// Records a failed fetch
    ///
    /// When the parent reaches `max_consecutive_failures` failed children in a
    /// row, its children still in the frontier are removed and returned so the
    /// caller can report them.
    pub fn record_failure(&mut self, fetch: &ScheduledFetch) -> Vec<QueuedUrl> {
        let Some(parent) = fetch.url.parent else {
            return Vec::new();
        };

        let streak = self.failure_streaks.entry(parent).or_insert(0);
        *streak += 1;

        if *streak < self.config.max_consecutive_failures.max(1)
            || !self.abandoned_parents.insert(parent)
        {
            return Vec::new();
        }

        let (abandoned, kept): (VecDeque<_>, VecDeque<_>) = self
            .frontier
            .drain(..)
            .partition(|queued| queued.parent == Some(parent));
        self.frontier = kept;

        if !abandoned.is_empty() {
            tracing::info!(
                "Abandoning {} queued children of page #{} after {} consecutive failures",
                abandoned.len(),
                parent,
                streak
            );
        }

        abandoned.into()
    }

    /// Number of successful fetches the budget still allows
    pub fn remaining_pages(&self) -> usize {
        (self.config.max_pages_per_site as usize).saturating_sub(self.pages_visited)
    }

    /// Checks whether the page budget is used up
    pub fn page_limit_reached(&self) -> bool {
        self.remaining_pages() == 0
    }

    /// Returns the number of URLs handed out so far
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Returns the number of successful fetches recorded
    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    /// Returns the current size of the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Checks if the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Returns the number of distinct normalized URLs seen
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
