//! Text helpers shared by cleaning, extraction and merging

use std::collections::BTreeSet;

/// Glyphs documentation generators append to headings as permalinks
const ANCHOR_GLYPHS: &[char] = &['¶', '#', '§'];

/// Words lowercased inside title-cased names (unless first)
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "from", "in", "into", "nor", "of", "on",
    "or", "the", "to", "via", "vs", "with",
];

/// Words ignored when comparing descriptions
const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "also", "been", "before", "being", "below", "between",
    "both", "could", "does", "doing", "down", "during", "each", "from", "further", "have",
    "having", "here", "into", "just", "more", "most", "much", "must", "only", "other", "over",
    "same", "should", "some", "such", "than", "that", "their", "them", "then", "there", "these",
    "they", "this", "those", "through", "under", "until", "very", "want", "were", "what",
    "when", "where", "which", "while", "will", "with", "within", "would", "your", "yours",
    "allows", "lets", "page", "section", "using", "used", "uses",
];

/// Collapses all whitespace runs to single spaces and trims
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes permalink glyphs from both ends of a heading
pub fn strip_anchor_glyphs(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || ANCHOR_GLYPHS.contains(&c))
}

/// Key used to compare headings against a denylist
///
/// Case-insensitive, whitespace-normalized, permalink glyphs ignored.
pub fn heading_key(text: &str) -> String {
    normalize_whitespace(strip_anchor_glyphs(text)).to_lowercase()
}

/// Normalizes a module name for equality checks
///
/// Lowercases, turns punctuation into spaces and collapses whitespace, so
/// "Account-Settings" and "account settings" compare equal.
pub fn normalize_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    normalize_whitespace(&replaced).to_lowercase()
}

/// Title-cases a name
///
/// Words that already contain capitals ("API", "iOS") are kept as written,
/// minor words are lowercased except in first position, and everything else
/// gets an uppercase first letter.
pub fn title_case(text: &str) -> String {
    normalize_whitespace(text)
        .split(' ')
        .enumerate()
        .map(|(i, word)| {
            if word.chars().any(char::is_uppercase) {
                word.to_string()
            } else if i > 0 && MINOR_WORDS.contains(&word) {
                word.to_string()
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Splits text into sentences
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace or the end of
/// the text. Sentences are whitespace-normalized; empty ones are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().map_or(true, |n| n.is_whitespace()) {
            let sentence = normalize_whitespace(&current);
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            current.clear();
        }
    }

    let rest = normalize_whitespace(&current);
    if !rest.is_empty() {
        sentences.push(rest);
    }

    sentences
}

/// Cuts text to at most `max_chars` characters at a word boundary
///
/// A single word longer than the bound is cut mid-word.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let next_is_boundary = text
        .chars()
        .nth(max_chars)
        .map_or(true, char::is_whitespace);
    if next_is_boundary {
        return cut.trim_end().to_string();
    }

    match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => cut[..idx].trim_end().to_string(),
        _ => cut,
    }
}

/// Lowercase alphabetic words of four or more letters that are not stopwords
pub fn significant_terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() >= 4 && word.chars().all(char::is_alphabetic))
        .map(str::to_lowercase)
        .filter(|word| !STOPWORDS.contains(&word.as_str()))
        .collect()
}

/// Lowercase words of a text, punctuation removed
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}
