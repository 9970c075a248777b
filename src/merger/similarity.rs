use crate::text::normalize_name;
use std::collections::{BTreeSet, HashSet};

/// Edit distance between two strings, counted in characters
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Similarity of two module names in [0, 1]
///
/// The larger of token Jaccard overlap and normalized edit similarity,
/// computed on normalized names.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_name(a);
    let b = normalize_name(b);

    if a == b {
        return 1.0;
    }

    let tokens_a: HashSet<&str> = a.split(' ').filter(|t| !t.is_empty()).collect();
    let tokens_b: HashSet<&str> = b.split(' ').filter(|t| !t.is_empty()).collect();
    let union = tokens_a.union(&tokens_b).count();
    let jaccard = if union == 0 {
        0.0
    } else {
        tokens_a.intersection(&tokens_b).count() as f64 / union as f64
    };

    let max_len = a.chars().count().max(b.chars().count());
    let edit = if max_len == 0 {
        0.0
    } else {
        1.0 - levenshtein(&a, &b) as f64 / max_len as f64
    };

    jaccard.max(edit)
}

/// Decides whether two modules (or two submodules) are the same thing
///
/// Equal normalized names always match. Otherwise the names must be similar
/// enough and the descriptions must share enough significant terms.
pub fn is_same_module(
    a_name: &str,
    a_terms: &BTreeSet<String>,
    b_name: &str,
    b_terms: &BTreeSet<String>,
    similarity_threshold: f64,
    min_shared_keywords: usize,
) -> bool {
    if normalize_name(a_name) == normalize_name(b_name) {
        return true;
    }

    name_similarity(a_name, b_name) >= similarity_threshold
        && a_terms.intersection(b_terms).count() >= min_shared_keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::significant_terms;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_name_similarity_normalizes() {
        assert_eq!(name_similarity("Account-Settings", "account settings"), 1.0);
    }

    #[test]
    fn test_name_similarity_takes_max() {
        // Token overlap 1/3, edit similarity 15/16
        let similarity = name_similarity("Account Setting", "Account Settings");
        assert!(similarity > 0.9);

        let jaccard_only = name_similarity("Billing Reports", "Reports Billing");
        assert!((jaccard_only - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_name_similarity_unrelated() {
        assert!(name_similarity("Billing", "Webhooks") < 0.5);
    }

    #[test]
    fn test_same_module_requires_shared_terms() {
        let a = significant_terms("Manage account settings and profile details.");
        let b = significant_terms("Account settings store profile details for users.");
        let unrelated = significant_terms("Nothing in common here at all.");

        assert!(is_same_module("Account Setting", &a, "Account Settings", &b, 0.8, 2));
        assert!(!is_same_module(
            "Account Setting",
            &a,
            "Account Settings",
            &unrelated,
            0.8,
            2
        ));
    }

    #[test]
    fn test_equal_names_always_match() {
        let empty = BTreeSet::new();
        assert!(is_same_module("API Keys", &empty, "api  keys", &empty, 0.99, 5));
    }
}
