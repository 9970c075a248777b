//! Extraction engine
//!
//! Wires the pipeline together for each site: the crawl loop feeds cleaned
//! pages to an extraction task, and once both are done the candidates are
//! merged and assembled into the site's result. Sites run as independent
//! tasks, each with its own cancellation token.

use crate::cleaner::Cleaner;
use crate::config::{validate, Config, CrawlerConfig};
use crate::crawler::{build_http_client, Coordinator, Fetcher, HttpFetcher, Page};
use crate::describe::{Describer, EndpointDescriber, SentenceDescriber};
use crate::extractor::{Extractor, ModuleCandidate};
use crate::merger::merge;
use crate::output::{assemble, CrawlStats, ExtractionResult, PageError, StopReason};
use crate::state::PageState;
use crate::url::normalize_url;
use crate::ConfigError;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Pages buffered between the crawl loop and extraction
const PAGE_CHANNEL_CAPACITY: usize = 32;

/// One seed URL and the crawl limits it runs under
#[derive(Debug, Clone)]
pub struct Site {
    pub url: String,
    pub crawler: CrawlerConfig,
}

impl Site {
    pub fn new(url: impl Into<String>, crawler: CrawlerConfig) -> Self {
        Self {
            url: url.into(),
            crawler,
        }
    }
}

/// The extraction pipeline, shared by all sites of a run
///
/// Cheap to clone; every component sits behind an `Arc`.
#[derive(Clone)]
pub struct Engine {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    cleaner: Arc<Cleaner>,
    extractor: Arc<Extractor>,
}

impl Engine {
    /// Builds the engine with the HTTP fetcher and the configured describer
    ///
    /// The configuration is validated first, so nothing is crawled with a
    /// bad configuration.
    pub fn new(config: Config) -> crate::Result<Self> {
        validate(&config)?;

        let client = build_http_client(&config.user_agent)?;
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::with_client(client.clone()));

        let describer: Arc<dyn Describer> = if config.extractor.enable_ai_descriptions {
            let endpoint = config
                .extractor
                .summarizer_endpoint
                .as_deref()
                .ok_or_else(|| {
                    ConfigError::Validation(
                        "summarizer_endpoint is required when enable_ai_descriptions is set"
                            .to_string(),
                    )
                })?;
            let endpoint = Url::parse(endpoint)
                .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

            tracing::info!("Using summarizer endpoint {}", endpoint);
            Arc::new(EndpointDescriber::new(
                client,
                endpoint,
                Duration::from_millis(config.extractor.describe_timeout_ms),
            ))
        } else {
            Arc::new(SentenceDescriber::new(
                config.extractor.description_sentences,
                config.extractor.max_excerpt_chars,
            ))
        };

        Self::assemble_parts(config, fetcher, describer).map_err(Into::into)
    }

    /// Builds the engine around a caller-supplied fetcher and describer
    pub fn with_parts(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        describer: Arc<dyn Describer>,
    ) -> Result<Self, ConfigError> {
        validate(&config)?;
        Self::assemble_parts(config, fetcher, describer)
    }

    /// Builds the components of an already validated configuration
    fn assemble_parts(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        describer: Arc<dyn Describer>,
    ) -> Result<Self, ConfigError> {
        let cleaner = Cleaner::new(&config.cleaner)?;
        let extractor = Extractor::new(config.extractor.clone(), describer)?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            cleaner: Arc::new(cleaner),
            extractor: Arc::new(extractor),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A site for `url` using the engine's crawl limits
    pub fn site(&self, url: impl Into<String>) -> Site {
        Site::new(url, self.config.crawler.clone())
    }

    /// Runs every site concurrently
    ///
    /// Each site gets a child token of `cancel`: cancelling `cancel` stops
    /// all of them, while a site's own token never affects the others.
    /// Results come back in input order.
    pub async fn extract_all(
        &self,
        sites: Vec<Site>,
        cancel: &CancellationToken,
    ) -> Vec<ExtractionResult> {
        tracing::info!("Extracting modules from {} sites", sites.len());

        let handles: Vec<_> = sites
            .into_iter()
            .map(|site| {
                let engine = self.clone();
                let token = cancel.child_token();
                let url = site.url.clone();
                let handle = tokio::spawn(async move { engine.extract_site(&site, token).await });
                (url, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (url, outcome) in join_all(
            handles
                .into_iter()
                .map(|(url, handle)| async move { (url, handle.await) }),
        )
        .await
        {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    tracing::error!("Extraction task for {} did not finish: {}", url, e);
                    let now = Utc::now();
                    results.push(empty_result(&url, StopReason::Cancelled, Vec::new(), now));
                }
            }
        }

        results
    }

    /// Crawls one site and builds its result
    ///
    /// Never fails: an invalid or unreachable seed gives a result with no
    /// modules and the matching stop reason. The site budget and `cancel`
    /// bound extraction as well as the crawl; when either cuts extraction
    /// short, the candidates gathered so far are still merged.
    pub async fn extract_site(&self, site: &Site, cancel: CancellationToken) -> ExtractionResult {
        let started_at = Utc::now();
        let start = Instant::now();

        let seed = match normalize_url(&site.url) {
            Ok(seed) => seed,
            Err(e) => {
                tracing::warn!("Invalid seed URL {:?}: {}", site.url, e);
                let error = PageError {
                    url: site.url.clone(),
                    state: PageState::Failed,
                    reason: e.to_string(),
                };
                return empty_result(&site.url, StopReason::InvalidSeed, vec![error], started_at);
            }
        };

        let coordinator =
            Coordinator::new(site.crawler.clone(), self.fetcher.clone(), self.cleaner.clone());
        let deadline =
            tokio::time::Instant::now() + Duration::from_millis(site.crawler.site_budget_ms);
        let (pages_tx, pages_rx) = mpsc::channel::<Page>(PAGE_CHANNEL_CAPACITY);
        let extraction = tokio::spawn(extract_pages(
            self.extractor.clone(),
            pages_rx,
            cancel.clone(),
            deadline,
        ));

        let mut report = coordinator.run(seed, pages_tx, cancel).await;

        let (candidates, interrupted) = match extraction.await {
            Ok(extracted) => extracted,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                tracing::error!("Extraction for {} did not finish: {}", site.url, e);
                (Vec::new(), None)
            }
        };

        if let Some(reason) = interrupted {
            if matches!(
                report.stop_reason,
                StopReason::Completed | StopReason::PageLimit
            ) {
                tracing::warn!("Extraction for {} interrupted: {}", site.url, reason);
                report.stop_reason = reason;
            }
        }

        let outcome = merge(candidates, &self.config.merger);
        let truncated = report.truncated();

        let stats = CrawlStats {
            pages_visited: report.pages_visited,
            pages_skipped: report.pages_skipped,
            truncated,
            elapsed_ms: start.elapsed().as_millis() as u64,
            stop_reason: report.stop_reason,
            modules_excluded: outcome.excluded,
            errors: report.errors,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Site {} done: {} modules ({} excluded), stop reason {}",
            site.url,
            outcome.modules.len(),
            outcome.excluded,
            stats.stop_reason
        );

        assemble(&site.url, outcome.modules, stats)
    }
}

/// Extraction stage: drains the page channel until the crawl closes it
///
/// Stops early when `cancel` fires or `deadline` passes, returning what was
/// extracted so far together with the reason.
async fn extract_pages(
    extractor: Arc<Extractor>,
    mut pages: mpsc::Receiver<Page>,
    cancel: CancellationToken,
    deadline: tokio::time::Instant,
) -> (Vec<ModuleCandidate>, Option<StopReason>) {
    let mut candidates = Vec::new();

    loop {
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => return (candidates, Some(StopReason::Cancelled)),
            _ = tokio::time::sleep_until(deadline) => {
                return (candidates, Some(StopReason::TimeBudget));
            }
            page = pages.recv() => match page {
                Some(page) => page,
                None => return (candidates, None),
            },
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return (candidates, Some(StopReason::Cancelled)),
            _ = tokio::time::sleep_until(deadline) => {
                return (candidates, Some(StopReason::TimeBudget));
            }
            extracted = extractor.extract(&page) => candidates.extend(extracted),
        }
    }
}

fn empty_result(
    site_url: &str,
    stop_reason: StopReason,
    errors: Vec<PageError>,
    started_at: chrono::DateTime<Utc>,
) -> ExtractionResult {
    let finished_at = Utc::now();
    let stats = CrawlStats {
        pages_visited: 0,
        pages_skipped: 0,
        truncated: stop_reason.is_truncated(),
        elapsed_ms: (finished_at - started_at).num_milliseconds().max(0) as u64,
        stop_reason,
        modules_excluded: 0,
        errors,
        started_at,
        finished_at,
    };
    assemble(site_url, Vec::new(), stats)
}
