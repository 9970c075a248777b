use crate::text::normalize_whitespace;

/// A structural heading and the cleaned text it introduces
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Heading level, 1 to 3
    pub level: u8,

    /// Whitespace-normalized heading text
    pub heading: String,

    /// Whitespace-normalized body, subsections included
    pub body: String,

    /// Index of the heading among the page's structural headings
    pub position: usize,

    /// Position of the nearest enclosing heading of a lower level
    pub parent: Option<usize>,
}

/// A heading with only the text that sits directly under it
#[derive(Debug)]
pub(crate) struct RawSection {
    pub level: u8,
    pub heading: String,
    pub text: String,
    pub parent: Option<usize>,
}

/// Builds segments from raw sections
///
/// A segment's body runs until the next heading of equal or higher level, so
/// it includes nested subsections, except those under a chrome heading.
/// Chrome headings and segments whose body is shorter than `min_body_length`
/// are not emitted.
pub(crate) fn assemble_segments<F>(
    sections: &[RawSection],
    min_body_length: usize,
    is_chrome: F,
) -> Vec<Segment>
where
    F: Fn(&str) -> bool,
{
    let chrome: Vec<bool> = sections.iter().map(|s| is_chrome(&s.heading)).collect();
    let mut segments = Vec::new();

    for (position, section) in sections.iter().enumerate() {
        if chrome[position] {
            continue;
        }

        let mut body = section.text.clone();
        for (offset, nested) in sections[position + 1..].iter().enumerate() {
            if nested.level <= section.level {
                break;
            }
            let idx = position + 1 + offset;
            if !under_chrome(sections, &chrome, idx, position) {
                body.push(' ');
                body.push_str(&nested.text);
            }
        }

        let body = normalize_whitespace(&body);
        if body.chars().count() < min_body_length {
            continue;
        }

        segments.push(Segment {
            level: section.level,
            heading: section.heading.clone(),
            body,
            position,
            parent: section.parent,
        });
    }

    segments
}

/// Whether a chrome heading sits on the path from `idx` up to `ancestor`
fn under_chrome(sections: &[RawSection], chrome: &[bool], idx: usize, ancestor: usize) -> bool {
    let mut current = Some(idx);
    while let Some(i) = current {
        if i == ancestor {
            return false;
        }
        if chrome[i] {
            return true;
        }
        current = sections[i].parent;
    }
    false
}
