//! Content cleaning
//!
//! Turns a fetched HTML document into an ordered list of heading segments:
//! - Chrome subtrees (navigation, headers, footers, sidebars, ads) are removed
//! - Non-content tags (scripts, styles, forms) are removed
//! - `h1`-`h3` headings with enough text per element split the content root
//!   into sections; `h4`-`h6` are ordinary body text
//! - Each section's body collects its own text and that of its subsections

mod sections;

pub use sections::Segment;

use crate::config::CleanerConfig;
use crate::text::{heading_key, normalize_whitespace};
use crate::{CleaningError, ConfigError};
use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use sections::{assemble_segments, RawSection};
use std::collections::HashSet;

/// Tags that never carry documentation prose
const NON_CONTENT_TAGS: &str = "script, style, noscript, template, svg, form";

/// Candidate content roots, in order of preference
const CONTENT_ROOTS: &[&str] = &["main", "article", "body"];

/// Compiled cleaning rules
#[derive(Debug)]
pub struct Cleaner {
    removed: Vec<Selector>,
    roots: Vec<Selector>,
    chrome_headings: HashSet<String>,
    min_body_length: usize,
    density_threshold: f64,
}

impl Cleaner {
    /// Compiles the configured selectors and denylist
    pub fn new(config: &CleanerConfig) -> Result<Self, ConfigError> {
        let mut removed = Vec::with_capacity(config.ignore_selectors.len() + 1);
        for selector in config
            .ignore_selectors
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(NON_CONTENT_TAGS))
        {
            removed.push(parse_selector(selector)?);
        }

        let roots = CONTENT_ROOTS
            .iter()
            .map(|root| parse_selector(root))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            removed,
            roots,
            chrome_headings: config
                .chrome_headings
                .iter()
                .map(|h| heading_key(h))
                .collect(),
            min_body_length: config.min_body_length,
            density_threshold: config.heading_density_threshold,
        })
    }

    /// Cleans a raw document into segments, in document order
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    pub fn clean(&self, raw: &[u8]) -> Result<Vec<Segment>, CleaningError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(CleaningError::EmptyDocument);
        }
        if raw.contains(&0) {
            return Err(CleaningError::BinaryContent);
        }

        let html = String::from_utf8_lossy(raw);
        let document = Html::parse_document(&html);

        let removed: HashSet<NodeId> = self
            .removed
            .iter()
            .flat_map(|selector| document.select(selector).map(|element| element.id()))
            .collect();

        let root = self
            .roots
            .iter()
            .find_map(|selector| {
                document
                    .select(selector)
                    .find(|element| !removed.contains(&element.id()))
            })
            .ok_or(CleaningError::NoContentRoot)?;

        let sections = self.collect_sections(*root, &removed);
        Ok(assemble_segments(
            &sections,
            self.min_body_length,
            |heading| self.is_chrome_heading(heading),
        ))
    }

    /// Checks a heading against the chrome denylist
    pub fn is_chrome_heading(&self, heading: &str) -> bool {
        self.chrome_headings.contains(&heading_key(heading))
    }

    /// Walks the content root in document order, splitting it at structural headings
    ///
    /// Text before the first structural heading is dropped.
    fn collect_sections(
        &self,
        root: NodeRef<'_, Node>,
        removed: &HashSet<NodeId>,
    ) -> Vec<RawSection> {
        let mut sections: Vec<RawSection> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        let mut stack: Vec<NodeRef<'_, Node>> = root.children().rev().collect();

        while let Some(node) = stack.pop() {
            if removed.contains(&node.id()) {
                continue;
            }

            match node.value() {
                Node::Text(text) => {
                    if let Some(current) = sections.last_mut() {
                        current.text.push_str(text);
                        current.text.push(' ');
                    }
                }
                Node::Element(element) => {
                    let Some(level) = heading_level(element.name()) else {
                        stack.extend(node.children().rev());
                        continue;
                    };

                    let Some(heading) = self.structural_heading(node) else {
                        continue;
                    };

                    while open
                        .last()
                        .is_some_and(|&idx| sections[idx].level >= level)
                    {
                        open.pop();
                    }

                    sections.push(RawSection {
                        level,
                        heading,
                        text: String::new(),
                        parent: open.last().copied(),
                    });
                    open.push(sections.len() - 1);
                }
                _ => {}
            }
        }

        sections
    }

    /// Returns the heading text when the heading is dense enough to be content
    ///
    /// Density is `text length / (1 + descendant elements)`; icon-heavy or
    /// link-wrapped widget headings fall under the threshold.
    fn structural_heading(&self, node: NodeRef<'_, Node>) -> Option<String> {
        let element = ElementRef::wrap(node)?;
        let text = normalize_whitespace(&element.text().collect::<String>());
        if text.is_empty() {
            return None;
        }

        let descendants = node
            .descendants()
            .skip(1)
            .filter(|n| n.value().is_element())
            .count();
        let density = text.chars().count() as f64 / (1 + descendants) as f64;

        if density >= self.density_threshold {
            Some(text)
        } else {
            tracing::trace!("Dropping low-density heading {:?} ({:.2})", text, density);
            None
        }
    }
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        _ => None,
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("{}: {:?}", selector, e)))
}
