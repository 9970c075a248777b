//! Module merging and confidence scoring
//!
//! All candidates of a site are folded into one module tree:
//! - Candidates are taken in crawl order (page order, then heading position)
//! - Matching candidates are merged until no two modules match each other
//! - Descriptions and submodules of merged candidates are combined
//! - Each module gets a confidence score; weak modules are dropped

mod description;
mod similarity;

pub use description::merge_descriptions;
pub use similarity::{is_same_module, levenshtein, name_similarity};

use crate::config::{ConfidenceConfig, MergerConfig};
use crate::extractor::{ModuleCandidate, SubmoduleCandidate};
use crate::output::{Module, Submodule};
use crate::text::significant_terms;
use std::collections::BTreeSet;

/// Modules that survived the confidence cut, plus how many did not
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Merged modules in first-seen order
    pub modules: Vec<Module>,

    /// Modules dropped for scoring below the minimum confidence
    pub excluded: usize,
}

/// Merges all candidates of one site into modules
pub fn merge(mut candidates: Vec<ModuleCandidate>, config: &MergerConfig) -> MergeOutcome {
    candidates.sort_by_key(|c| (c.page_order, c.position));
    let total = candidates.len();

    let groups: Vec<ModuleGroup> = candidates.into_iter().map(ModuleGroup::from).collect();
    let groups = merge_to_fixpoint(groups, config);

    tracing::debug!("Merged {} candidates into {} modules", total, groups.len());

    let mut outcome = MergeOutcome::default();
    for group in groups {
        let module = group.finish(config);
        if module.confidence_score < config.min_confidence {
            tracing::debug!(
                "Excluding module {:?} with confidence {:.3}",
                module.name,
                module.confidence_score
            );
            outcome.excluded += 1;
        } else {
            outcome.modules.push(module);
        }
    }

    outcome
}

/// Confidence of a module from its contributors
///
/// `clamp(base + avg_score_weight * avg_raw_score
///     + corroboration_weight * min(sources, corroboration_cap)
///     - degraded_penalty * degraded_fraction, 0, 1)`
pub fn confidence(
    config: &ConfidenceConfig,
    avg_raw_score: f64,
    sources: usize,
    degraded_fraction: f64,
) -> f64 {
    let corroboration = sources.min(config.corroboration_cap) as f64;
    let score = config.base + config.avg_score_weight * avg_raw_score
        + config.corroboration_weight * corroboration
        - config.degraded_penalty * degraded_fraction;

    score.clamp(0.0, 1.0)
}

/// Something that can be matched and merged with its own kind
trait Mergeable: Sized {
    fn name(&self) -> &str;
    fn terms(&self) -> &BTreeSet<String>;
    fn absorb(&mut self, other: Self, config: &MergerConfig);
}

/// Greedily merges items in order, repeating until a pass merges nothing
fn merge_to_fixpoint<T: Mergeable>(mut items: Vec<T>, config: &MergerConfig) -> Vec<T> {
    loop {
        let before = items.len();
        let mut merged: Vec<T> = Vec::with_capacity(before);

        for item in items {
            let target = merged.iter_mut().find(|existing| {
                is_same_module(
                    existing.name(),
                    existing.terms(),
                    item.name(),
                    item.terms(),
                    config.similarity_threshold,
                    config.min_shared_keywords,
                )
            });

            match target {
                Some(existing) => existing.absorb(item, config),
                None => merged.push(item),
            }
        }

        items = merged;
        if items.len() == before {
            return items;
        }
    }
}

/// One page's evidence for a module
#[derive(Debug)]
struct Contribution {
    description: String,
    raw_score: f64,
    degraded: bool,
    source_url: String,
}

#[derive(Debug)]
struct ModuleGroup {
    name: String,
    terms: BTreeSet<String>,
    contributions: Vec<Contribution>,
    submodules: Vec<SubmoduleGroup>,
}

impl From<ModuleCandidate> for ModuleGroup {
    fn from(candidate: ModuleCandidate) -> Self {
        let raw_score = candidate.raw_score;
        let submodules = candidate
            .submodules
            .into_iter()
            .map(|sub| SubmoduleGroup::new(sub, raw_score))
            .collect();

        Self {
            name: candidate.name,
            terms: significant_terms(&candidate.description),
            contributions: vec![Contribution {
                description: candidate.description,
                raw_score,
                degraded: candidate.degraded,
                source_url: candidate.source_url,
            }],
            submodules,
        }
    }
}

impl Mergeable for ModuleGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn terms(&self) -> &BTreeSet<String> {
        &self.terms
    }

    fn absorb(&mut self, other: Self, config: &MergerConfig) {
        tracing::debug!("Merging {:?} into {:?}", other.name, self.name);

        self.terms.extend(other.terms);
        self.contributions.extend(other.contributions);

        let mut submodules = std::mem::take(&mut self.submodules);
        submodules.extend(other.submodules);
        self.submodules = merge_to_fixpoint(submodules, config);
    }
}

impl ModuleGroup {
    fn finish(self, config: &MergerConfig) -> Module {
        let descriptions: Vec<(&str, f64)> = self
            .contributions
            .iter()
            .map(|c| (c.description.as_str(), c.raw_score))
            .collect();
        let description = merge_descriptions(&descriptions, config.max_description_chars);

        let mut sources: Vec<String> = Vec::new();
        for contribution in &self.contributions {
            if !sources.contains(&contribution.source_url) {
                sources.push(contribution.source_url.clone());
            }
        }

        let count = self.contributions.len().max(1) as f64;
        let avg_raw_score = self.contributions.iter().map(|c| c.raw_score).sum::<f64>() / count;
        let degraded_fraction =
            self.contributions.iter().filter(|c| c.degraded).count() as f64 / count;

        let confidence_score = confidence(
            &config.confidence,
            avg_raw_score,
            sources.len(),
            degraded_fraction,
        );

        let submodules = self
            .submodules
            .into_iter()
            .map(|sub| sub.finish(config))
            .collect();

        Module {
            name: self.name,
            description,
            submodules,
            confidence_score,
            sources,
        }
    }
}

#[derive(Debug)]
struct SubmoduleGroup {
    name: String,
    terms: BTreeSet<String>,
    descriptions: Vec<(String, f64)>,
}

impl SubmoduleGroup {
    fn new(candidate: SubmoduleCandidate, raw_score: f64) -> Self {
        Self {
            name: candidate.name,
            terms: significant_terms(&candidate.description),
            descriptions: vec![(candidate.description, raw_score)],
        }
    }

    fn finish(self, config: &MergerConfig) -> Submodule {
        let descriptions: Vec<(&str, f64)> = self
            .descriptions
            .iter()
            .map(|(d, score)| (d.as_str(), *score))
            .collect();

        Submodule {
            name: self.name,
            description: merge_descriptions(&descriptions, config.max_description_chars),
        }
    }
}

impl Mergeable for SubmoduleGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn terms(&self) -> &BTreeSet<String> {
        &self.terms
    }

    fn absorb(&mut self, other: Self, _config: &MergerConfig) {
        self.terms.extend(other.terms);
        self.descriptions.extend(other.descriptions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize_name;
    use std::collections::HashSet;

    fn candidate(name: &str, description: &str, page_order: usize, position: usize) -> ModuleCandidate {
        ModuleCandidate {
            name: name.to_string(),
            description: description.to_string(),
            submodules: Vec::new(),
            source_url: format!("https://docs.example.com/p{}", page_order),
            page_order,
            position,
            raw_score: 0.6,
            degraded: false,
        }
    }

    fn submodule(name: &str, description: &str) -> SubmoduleCandidate {
        SubmoduleCandidate {
            name: name.to_string(),
            description: description.to_string(),
            degraded: false,
        }
    }

    fn permissive() -> MergerConfig {
        MergerConfig {
            min_confidence: 0.0,
            ..MergerConfig::default()
        }
    }

    /// Turns merged modules back into candidates, one page each
    fn as_candidates(modules: &[Module]) -> Vec<ModuleCandidate> {
        modules
            .iter()
            .enumerate()
            .map(|(i, module)| ModuleCandidate {
                submodules: module
                    .submodules
                    .iter()
                    .map(|s| submodule(&s.name, &s.description))
                    .collect(),
                ..candidate(&module.name, &module.description, i, 0)
            })
            .collect()
    }

    #[test]
    fn test_equal_names_merge() {
        let outcome = merge(
            vec![
                candidate("Account Settings", "Manage your profile.", 0, 0),
                candidate("account-settings", "Change your password.", 1, 0),
            ],
            &permissive(),
        );

        assert_eq!(outcome.modules.len(), 1);
        let module = &outcome.modules[0];
        assert_eq!(module.name, "Account Settings");
        assert_eq!(module.description, "Manage your profile. Change your password.");
        assert_eq!(module.sources.len(), 2);
    }

    #[test]
    fn test_similar_names_need_shared_terms() {
        let outcome = merge(
            vec![
                candidate("Account Setting", "Account profile details live here.", 0, 0),
                candidate("Account Settings", "Edit account profile details.", 1, 0),
                candidate("Account Settingz", "Totally unrelated words.", 2, 0),
            ],
            &permissive(),
        );

        let names: Vec<&str> = outcome.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Account Setting", "Account Settingz"]);
    }

    #[test]
    fn test_earliest_crawled_name_is_canonical() {
        let outcome = merge(
            vec![
                candidate("billing", "Invoices.", 2, 0),
                candidate("Billing", "Payments.", 0, 5),
            ],
            &permissive(),
        );
        assert_eq!(outcome.modules[0].name, "Billing");
        assert_eq!(outcome.modules[0].description, "Payments. Invoices.");
    }

    #[test]
    fn test_merging_is_idempotent() {
        let candidates = vec![
            candidate("Account Settings", "Account profile details.", 0, 0),
            candidate("Account Setting", "Update account profile details.", 1, 0),
            candidate("Billing", "Invoices and payments.", 1, 1),
            candidate("Reports", "Usage reports.", 2, 0),
            candidate("Report", "Usage reports and exports.", 3, 0),
        ];

        let once = merge(candidates, &permissive());
        let twice = merge(as_candidates(&once.modules), &permissive());

        let names = |modules: &[Module]| -> Vec<String> {
            modules.iter().map(|m| m.name.clone()).collect()
        };
        assert_eq!(names(&once.modules), names(&twice.modules));
    }

    #[test]
    fn test_no_two_final_modules_match() {
        let config = permissive();
        let outcome = merge(
            vec![
                candidate("Data Export", "Export data files.", 0, 0),
                candidate("Data Exports", "Export data archives.", 1, 0),
                candidate("Data Exporting", "Export data files daily.", 2, 0),
            ],
            &config,
        );

        for (i, a) in outcome.modules.iter().enumerate() {
            for b in outcome.modules.iter().skip(i + 1) {
                assert!(!is_same_module(
                    &a.name,
                    &significant_terms(&a.description),
                    &b.name,
                    &significant_terms(&b.description),
                    config.similarity_threshold,
                    config.min_shared_keywords,
                ));
            }
        }
    }

    #[test]
    fn test_confidence_grows_with_contributors() {
        let config = permissive();
        let mut previous = 0.0;

        for count in 1..=7 {
            let candidates = (0..count)
                .map(|page| candidate("Webhooks", "Deliver events.", page, 0))
                .collect();
            let outcome = merge(candidates, &config);
            let score = outcome.modules[0].confidence_score;
            assert!(score >= previous, "{} contributors scored {}", count, score);
            previous = score;
        }
    }

    #[test]
    fn test_same_page_does_not_corroborate() {
        let config = permissive();
        let outcome = merge(
            vec![
                candidate("Webhooks", "Deliver events.", 0, 0),
                candidate("Webhooks", "Deliver events.", 0, 1),
            ],
            &config,
        );
        assert_eq!(outcome.modules[0].sources.len(), 1);
        assert!((outcome.modules[0].confidence_score - (0.5 * 0.6 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_degraded_contributors_lower_confidence() {
        let config = permissive();
        let clean = merge(vec![candidate("Alerts", "Alert rules.", 0, 0)], &config);

        let mut degraded = candidate("Alerts", "Alert rules.", 0, 0);
        degraded.degraded = true;
        let degraded = merge(vec![degraded], &config);

        assert!(degraded.modules[0].confidence_score < clean.modules[0].confidence_score);
    }

    #[test]
    fn test_low_confidence_excluded_and_counted() {
        let config = MergerConfig {
            min_confidence: 0.3,
            ..MergerConfig::default()
        };
        let mut weak = candidate("Footnotes", "Small print.", 0, 0);
        weak.raw_score = 0.1;

        let outcome = merge(vec![weak, candidate("Billing", "Invoices.", 0, 1)], &config);
        assert_eq!(outcome.excluded, 1);
        assert_eq!(outcome.modules.len(), 1);
        assert_eq!(outcome.modules[0].name, "Billing");
    }

    #[test]
    fn test_submodules_unioned_without_duplicates() {
        let mut first = candidate("Account Settings", "Profile.", 0, 0);
        first.submodules = vec![
            submodule("Change Username", "Pick a new username."),
            submodule("Privacy Settings", "Control visibility."),
        ];
        let mut second = candidate("Account Settings", "Profile.", 1, 0);
        second.submodules = vec![
            submodule("change username", "Usernames must be unique."),
            submodule("Delete Account", "Remove everything."),
        ];

        let outcome = merge(vec![first, second], &permissive());
        let module = &outcome.modules[0];

        let names: Vec<&str> = module.submodules.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Change Username", "Privacy Settings", "Delete Account"]);
        assert_eq!(
            module.submodules[0].description,
            "Pick a new username. Usernames must be unique."
        );

        let unique: HashSet<String> = module
            .submodules
            .iter()
            .map(|s| normalize_name(&s.name))
            .collect();
        assert_eq!(unique.len(), module.submodules.len());
    }

    #[test]
    fn test_confidence_formula() {
        let config = ConfidenceConfig::default();
        assert!((confidence(&config, 0.8, 2, 0.5) - (0.4 + 0.2 - 0.05)).abs() < 1e-9);
        assert!((confidence(&config, 1.0, 50, 0.0) - 1.0).abs() < 1e-9);
        assert_eq!(confidence(&config, 0.0, 0, 1.0), 0.0);
    }
}
