//! Module candidate extraction
//!
//! Each cleaned page is turned into module candidates:
//! - `h1`/`h2` segments become top-level candidates
//! - `h3` segments become submodules of their enclosing candidate, or
//!   candidates of their own when that candidate was not emitted
//! - Descriptions come from the configured `Describer`; failures fall back
//!   to a body excerpt and mark the candidate degraded
//! - Every candidate gets a raw score from heading level, body length and
//!   domain keywords

mod naming;
mod scoring;

pub use naming::Namer;
pub use scoring::{heading_signal, keyword_hits, raw_score};

use crate::cleaner::Segment;
use crate::config::ExtractorConfig;
use crate::crawler::Page;
use crate::describe::{excerpt, relevant_sentences, Describer};
use crate::state::PageState;
use crate::text::{normalize_name, truncate_at_word};
use crate::ConfigError;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on a listed submodule's description
const LISTED_DESCRIPTION_CHARS: usize = 200;

/// A proposed submodule
#[derive(Debug, Clone, PartialEq)]
pub struct SubmoduleCandidate {
    pub name: String,
    pub description: String,
    pub degraded: bool,
}

/// A module proposed by one page
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleCandidate {
    /// Title-cased name derived from the heading
    pub name: String,

    /// Draft description
    pub description: String,

    /// Submodules in document order, names unique (case-insensitive)
    pub submodules: Vec<SubmoduleCandidate>,

    /// URL of the page the candidate came from
    pub source_url: String,

    /// Breadth-first order of that page
    pub page_order: usize,

    /// Position of the heading on that page
    pub position: usize,

    /// Raw extraction score in [0, 1]
    pub raw_score: f64,

    /// Whether this description or any submodule description fell back to an excerpt
    pub degraded: bool,
}

/// Where a segment ends up in the page's candidates
enum Role {
    Module,
    Submodule { of: usize },
}

/// Candidate extractor shared by all pages of a site
pub struct Extractor {
    config: ExtractorConfig,
    describer: Arc<dyn Describer>,
    namer: Namer,
}

impl Extractor {
    pub fn new(config: ExtractorConfig, describer: Arc<dyn Describer>) -> Result<Self, ConfigError> {
        Ok(Self {
            config,
            describer,
            namer: Namer::new()?,
        })
    }

    /// Extracts candidates from one page, in segment order
    ///
    /// Description requests for all segments of the page run concurrently;
    /// their results are used in segment order.
    pub async fn extract(&self, page: &Page) -> Vec<ModuleCandidate> {
        if page.state != PageState::Processed {
            tracing::debug!("Nothing to extract from {} ({})", page.url, page.state);
            return Vec::new();
        }
        tracing::debug!(
            "Extracting {} (HTTP {}, depth {}, {} links, {} segments)",
            page.final_url,
            page.status,
            page.depth,
            page.links.len(),
            page.segments.len()
        );
        let source_url = page.final_url.to_string();

        let mut planned: Vec<(&Segment, String, Role)> = Vec::new();
        let mut module_at: HashMap<usize, usize> = HashMap::new();
        let mut modules = 0;

        for segment in &page.segments {
            let name = self.namer.module_name(&segment.heading);
            if name.is_empty() {
                continue;
            }

            let parent_module = segment
                .parent
                .and_then(|parent| module_at.get(&parent).copied());

            let role = match (segment.level, parent_module) {
                (3, Some(of)) => Role::Submodule { of },
                _ => {
                    if segment.level <= 2 {
                        module_at.insert(segment.position, modules);
                    }
                    modules += 1;
                    Role::Module
                }
            };
            planned.push((segment, name, role));
        }

        let descriptions = join_all(
            planned
                .iter()
                .map(|(segment, _, _)| self.describe(&segment.heading, &segment.body)),
        )
        .await;

        let mut candidates: Vec<ModuleCandidate> = Vec::with_capacity(modules);
        let mut submodule_names: Vec<HashSet<String>> = Vec::with_capacity(modules);

        for ((segment, name, role), (description, degraded)) in
            planned.into_iter().zip(descriptions)
        {
            match role {
                Role::Module => {
                    candidates.push(ModuleCandidate {
                        name,
                        description,
                        submodules: Vec::new(),
                        source_url: source_url.clone(),
                        page_order: page.order,
                        position: segment.position,
                        raw_score: raw_score(
                            &self.config,
                            segment.level,
                            &segment.heading,
                            &segment.body,
                        ),
                        degraded,
                    });
                    submodule_names.push(HashSet::new());
                }
                Role::Submodule { of } => {
                    let (Some(parent), Some(names)) =
                        (candidates.get_mut(of), submodule_names.get_mut(of))
                    else {
                        continue;
                    };

                    if parent.submodules.len() >= self.config.max_submodules_per_module
                        || !names.insert(normalize_name(&name))
                    {
                        continue;
                    }
                    parent.degraded |= degraded;
                    parent.submodules.push(SubmoduleCandidate {
                        name,
                        description,
                        degraded,
                    });
                }
            }
        }

        if self.config.infer_listed_submodules {
            for (candidate, names) in candidates.iter_mut().zip(submodule_names.iter_mut()) {
                if !candidate.submodules.is_empty() {
                    continue;
                }
                let body = page
                    .segments
                    .iter()
                    .find(|s| s.position == candidate.position)
                    .map(|s| s.body.as_str())
                    .unwrap_or_default();
                self.add_listed_submodules(candidate, names, body);
            }
        }

        tracing::debug!(
            "Extracted {} candidates from {}",
            candidates.len(),
            source_url
        );

        candidates
    }

    /// Derives a module name from heading text
    pub fn module_name(&self, heading: &str) -> String {
        self.namer.module_name(heading)
    }

    /// Asks the describer, falling back to an excerpt
    ///
    /// Returns the description and whether it is degraded.
    async fn describe(&self, heading: &str, body: &str) -> (String, bool) {
        let timeout = Duration::from_millis(self.config.describe_timeout_ms);

        match tokio::time::timeout(timeout, self.describer.summarize(heading, body)).await {
            Ok(Ok(description)) if !description.trim().is_empty() => {
                (description.trim().to_string(), false)
            }
            Ok(Ok(_)) => {
                tracing::debug!("Describer returned nothing for {:?}", heading);
                (excerpt(body, self.config.max_excerpt_chars), true)
            }
            Ok(Err(e)) => {
                tracing::debug!("Describer failed for {:?}: {}", heading, e);
                (excerpt(body, self.config.max_excerpt_chars), true)
            }
            Err(_) => {
                tracing::debug!("Describer timed out for {:?}", heading);
                (excerpt(body, self.config.max_excerpt_chars), true)
            }
        }
    }

    /// Adds submodules named in phrases such as "includes A, B and C"
    fn add_listed_submodules(
        &self,
        candidate: &mut ModuleCandidate,
        names: &mut HashSet<String>,
        body: &str,
    ) {
        for name in self.namer.listed_names(body) {
            if candidate.submodules.len() >= self.config.max_submodules_per_module {
                break;
            }
            if normalize_name(&name) == normalize_name(&candidate.name)
                || !names.insert(normalize_name(&name))
            {
                continue;
            }

            let sentences = relevant_sentences(&name, body, 2);
            let description = if sentences.is_empty() {
                format!("Functionality related to {}.", name)
            } else {
                truncate_at_word(&sentences.join(" "), LISTED_DESCRIPTION_CHARS)
            };

            candidate.submodules.push(SubmoduleCandidate {
                name,
                description,
                degraded: false,
            });
        }
    }
}
