use super::{relevant_sentences, Describer};
use crate::text::{split_sentences, truncate_at_word};
use crate::DescribeError;
use async_trait::async_trait;

/// Deterministic describer built from the section's own sentences
///
/// Prefers sentences that mention the heading; otherwise uses the opening
/// sentences of the body.
#[derive(Debug, Clone)]
pub struct SentenceDescriber {
    sentences: usize,
    max_chars: usize,
}

impl SentenceDescriber {
    pub fn new(sentences: usize, max_chars: usize) -> Self {
        Self {
            sentences: sentences.max(1),
            max_chars,
        }
    }
}

#[async_trait]
impl Describer for SentenceDescriber {
    async fn summarize(&self, heading: &str, body: &str) -> Result<String, DescribeError> {
        let mut chosen = relevant_sentences(heading, body, self.sentences);
        if chosen.is_empty() {
            chosen = split_sentences(body)
                .into_iter()
                .take(self.sentences)
                .collect();
        }

        if chosen.is_empty() {
            return Err(DescribeError::Unavailable(format!(
                "no sentences to describe {:?}",
                heading
            )));
        }

        Ok(truncate_at_word(&chosen.join(" "), self.max_chars))
    }
}
