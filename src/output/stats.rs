//! Human-readable run statistics
//!
//! JSON results go to stdout; this summary goes to stderr so the two can be
//! separated.

use super::ExtractionResult;
use crate::state::PageState;
use std::collections::HashMap;

/// Prints a summary of each site's run to stderr
pub fn print_statistics(results: &[ExtractionResult]) {
    eprintln!("=== Extraction Statistics ===\n");

    for result in results {
        let stats = &result.stats;

        eprintln!("{}:", result.site_url);
        eprintln!("  Stop reason: {}", stats.stop_reason);
        let unparsed = stats.errors.iter().filter(|e| e.state.is_success()).count();
        let failed = stats.errors.iter().filter(|e| e.state.is_error()).count();
        eprintln!(
            "  Pages visited: {} ({} could not be segmented)",
            stats.pages_visited, unparsed
        );
        eprintln!(
            "  Pages skipped: {} ({} failed fetches)",
            stats.pages_skipped, failed
        );
        eprintln!("  Elapsed: {:.1}s", stats.elapsed_ms as f64 / 1000.0);
        eprintln!(
            "  Modules: {} ({} below minimum confidence)",
            result.modules.len(),
            stats.modules_excluded
        );
        if stats.truncated {
            eprintln!("  Results are partial (crawl was interrupted)");
        }

        let errors = error_summary(result);
        if !errors.is_empty() {
            eprintln!("  Errors:");
            for (state, count) in errors {
                eprintln!("    {}: {}", state, count);
            }
        }
        eprintln!();
    }
}

/// Error counts by page state, most frequent first
fn error_summary(result: &ExtractionResult) -> Vec<(PageState, usize)> {
    let mut counts: HashMap<PageState, usize> = HashMap::new();
    for error in &result.stats.errors {
        *counts.entry(error.state).or_default() += 1;
    }

    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    counts
}
