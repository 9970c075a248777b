use crate::text::{normalize_name, split_sentences, truncate_at_word};
use std::collections::HashSet;

/// Merges contributor descriptions into one
///
/// `contributions` holds `(description, raw_score)` pairs in first-seen
/// order. Distinct sentences are kept in that order; sentences that differ
/// only in case, punctuation or spacing count once. When the merged text is
/// longer than `max_chars`, the best-scoring contributor's description is
/// used instead (earliest wins ties), cut at a word boundary if needed.
pub fn merge_descriptions(contributions: &[(&str, f64)], max_chars: usize) -> String {
    let mut seen = HashSet::new();
    let mut sentences = Vec::new();

    for (description, _) in contributions {
        for sentence in split_sentences(description) {
            let key = normalize_name(&sentence);
            if key.is_empty() {
                continue;
            }
            if seen.insert(key) {
                sentences.push(sentence);
            }
        }
    }

    let merged = sentences.join(" ");
    if merged.chars().count() <= max_chars {
        return merged;
    }

    let mut best: Option<(&str, f64)> = None;
    for &(description, score) in contributions {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((description, score)),
        }
    }

    best.map(|(description, _)| truncate_at_word(description.trim(), max_chars))
        .unwrap_or_default()
}
