//! Output module for assembling and reporting extraction results
//!
//! This module handles:
//! - The result types serialized as JSON
//! - Ordering merged modules into a site's final result
//! - Printing run statistics for humans

mod result;
pub mod stats;

pub use result::{CrawlStats, ExtractionResult, Module, PageError, StopReason, Submodule};
pub use stats::print_statistics;

/// Builds a site's final result
///
/// Modules are ordered by descending confidence; modules with equal
/// confidence keep the order they were first seen in.
pub fn assemble(site_url: &str, mut modules: Vec<Module>, stats: CrawlStats) -> ExtractionResult {
    modules.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));

    ExtractionResult {
        site_url: site_url.to_string(),
        modules,
        stats,
    }
}
