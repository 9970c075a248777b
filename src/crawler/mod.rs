//! Crawler module for web page fetching and processing
//!
//! This module contains the site crawling logic, including:
//! - The `Fetcher` contract and its HTTP implementation
//! - HTML parsing and link extraction
//! - The breadth-first frontier and visited-set
//! - The crawl loop feeding cleaned pages to extraction

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, CrawlReport, Page};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, HttpFetcher};
pub use parser::extract_links;
pub use scheduler::{QueuedUrl, ScheduledFetch, Scheduler};
