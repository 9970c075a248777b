//! Description generation
//!
//! Candidate descriptions come from a `Describer`. Two implementations ship
//! with the crate:
//! - `SentenceDescriber` picks the body sentences that talk about the heading
//! - `EndpointDescriber` asks an HTTP summarization service
//!
//! Callers treat any error as a signal to fall back to an excerpt.

mod endpoint;
mod sentence;

pub use endpoint::EndpointDescriber;
pub use sentence::SentenceDescriber;

use crate::text::{split_sentences, truncate_at_word, words};
use crate::DescribeError;
use async_trait::async_trait;
use std::collections::HashSet;

/// Turns a heading and its body text into a short description
#[async_trait]
pub trait Describer: Send + Sync {
    /// Summarizes `body` as a description of the section titled `heading`
    async fn summarize(&self, heading: &str, body: &str) -> Result<String, DescribeError>;
}

/// Sentences of `text` that mention `topic`
///
/// A sentence is relevant when it contains the topic as a phrase, or shares
/// at least two words with it.
pub fn relevant_sentences(topic: &str, text: &str, limit: usize) -> Vec<String> {
    let topic_lower = topic.to_lowercase();
    let topic_words: HashSet<String> = words(topic).into_iter().collect();

    split_sentences(text)
        .into_iter()
        .filter(|sentence| {
            if sentence.to_lowercase().contains(&topic_lower) {
                return true;
            }
            let shared = words(sentence)
                .into_iter()
                .collect::<HashSet<_>>()
                .intersection(&topic_words)
                .count();
            shared >= 2
        })
        .take(limit)
        .collect()
}

/// Leading sentences of `body` that fit in `max_chars`
///
/// When even the first sentence is too long it is cut at a word boundary.
pub fn excerpt(body: &str, max_chars: usize) -> String {
    let mut result = String::new();

    for sentence in split_sentences(body) {
        let added = if result.is_empty() {
            sentence.chars().count()
        } else {
            sentence.chars().count() + 1
        };

        if result.chars().count() + added > max_chars {
            break;
        }
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(&sentence);
    }

    if result.is_empty() {
        truncate_at_word(&crate::text::normalize_whitespace(body), max_chars)
    } else {
        result
    }
}
