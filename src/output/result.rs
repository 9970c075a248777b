use crate::state::PageState;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Final result for one site
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Seed URL as given by the caller
    pub site_url: String,

    /// Modules, highest confidence first
    pub modules: Vec<Module>,

    pub stats: CrawlStats,
}

impl ExtractionResult {
    /// Finds a module by name (case-insensitive)
    pub fn module(&self, name: &str) -> Option<&Module> {
        let key = crate::text::normalize_name(name);
        self.modules
            .iter()
            .find(|m| crate::text::normalize_name(&m.name) == key)
    }
}

/// A merged module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub name: String,
    pub description: String,

    /// Submodules in first-seen order, serialized as `{name: description}`
    #[serde(serialize_with = "submodule_map")]
    pub submodules: Vec<Submodule>,

    /// Confidence in [0, 1]
    pub confidence_score: f64,

    /// Distinct URLs of the pages that contributed, in crawl order
    pub sources: Vec<String>,
}

impl Module {
    /// Finds a submodule by name (case-insensitive)
    pub fn submodule(&self, name: &str) -> Option<&Submodule> {
        let key = crate::text::normalize_name(name);
        self.submodules
            .iter()
            .find(|s| crate::text::normalize_name(&s.name) == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submodule {
    pub name: String,
    pub description: String,
}

fn submodule_map<S: Serializer>(submodules: &[Submodule], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(submodules.len()))?;
    for submodule in submodules {
        map.serialize_entry(&submodule.name, &submodule.description)?;
    }
    map.end()
}

/// Statistics of one site's run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStats {
    pub pages_visited: usize,
    pub pages_skipped: usize,

    /// True when the crawl was cut short by the time budget or cancellation
    pub truncated: bool,

    pub elapsed_ms: u64,
    pub stop_reason: StopReason,

    /// Modules dropped for scoring below the minimum confidence
    pub modules_excluded: usize,

    pub errors: Vec<PageError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Why a site's crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The frontier ran dry
    Completed,

    /// `max-pages-per-site` pages were fetched with URLs still queued
    PageLimit,

    /// The site's wall-clock budget elapsed
    TimeBudget,

    /// The caller cancelled the run
    Cancelled,

    /// The seed URL could not be fetched
    SeedUnreachable,

    /// The seed URL could not be parsed or is not http(s)
    InvalidSeed,
}

impl StopReason {
    /// Whether results are partial because the crawl was interrupted
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TimeBudget | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::PageLimit => "page_limit",
            Self::TimeBudget => "time_budget",
            Self::Cancelled => "cancelled",
            Self::SeedUnreachable => "seed_unreachable",
            Self::InvalidSeed => "invalid_seed",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page that failed, with the state it ended in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageError {
    pub url: String,
    pub state: PageState,
    pub reason: String,
}
