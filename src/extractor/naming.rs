//! Module names from headings, and submodule names from prose

use crate::text::{normalize_name, normalize_whitespace, strip_anchor_glyphs, title_case};
use crate::ConfigError;
use regex::Regex;
use std::collections::HashSet;

/// Leading section numbering: "1.", "2.3", "Chapter 4:", "Step 2 -"
const NUMBERING_PATTERN: &str = r"(?i)^(?:(?:chapter|part|section|module|step|lesson)\s+\d+(?:\.\d+)*\s*[.:)\-]?\s*|\d+(?:\.\d+)+\s+|\d+(?:\.\d+)*[.:)]\s*)";

/// "includes A, B and C", "such as A or B", "including A"
const LISTING_PATTERN: &str = r"(?i)\b(?:includes|including|such as)\s+([^.!?;:]+)";

/// Separators between listed items
const ITEM_SEPARATOR_PATTERN: &str = r"(?i),|\band\b|\bor\b";

/// Listed items with more words than this are prose, not names
const MAX_LISTED_ITEM_WORDS: usize = 5;

/// Compiled naming rules
#[derive(Debug, Clone)]
pub struct Namer {
    numbering: Regex,
    listing: Regex,
    separator: Regex,
}

impl Namer {
    pub fn new() -> Result<Self, ConfigError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern(e.to_string()))
        };

        Ok(Self {
            numbering: compile(NUMBERING_PATTERN)?,
            listing: compile(LISTING_PATTERN)?,
            separator: compile(ITEM_SEPARATOR_PATTERN)?,
        })
    }

    /// Derives a module name from heading text
    ///
    /// Permalink glyphs and leading numbering are removed and the result is
    /// title-cased. Returns an empty string when nothing is left.
    pub fn module_name(&self, heading: &str) -> String {
        let stripped = normalize_whitespace(strip_anchor_glyphs(heading));
        let unnumbered = self.numbering.replace(&stripped, "");
        let unnumbered = strip_anchor_glyphs(&unnumbered);

        if unnumbered.is_empty() {
            String::new()
        } else {
            title_case(unnumbered)
        }
    }

    /// Finds submodule names listed in running text
    ///
    /// Items are split on commas, "and" and "or"; items of three characters
    /// or less, or longer than a short phrase, are ignored. Names come back
    /// title-cased, first occurrence first, without duplicates.
    pub fn listed_names(&self, body: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();

        for capture in self.listing.captures_iter(body) {
            let Some(list) = capture.get(1) else {
                continue;
            };

            for item in self.separator.split(list.as_str()) {
                let item = normalize_whitespace(item.trim_matches(|c: char| {
                    c.is_whitespace() || matches!(c, '"' | '\'' | '(' | ')')
                }));
                if item.chars().count() <= 3
                    || item.split(' ').count() > MAX_LISTED_ITEM_WORDS
                {
                    continue;
                }

                let name = title_case(&item);
                if seen.insert(normalize_name(&name)) {
                    names.push(name);
                }
            }
        }

        names
    }
}
