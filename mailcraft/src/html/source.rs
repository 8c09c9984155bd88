//! Start-tag positions in the raw source.
//!
//! html5ever does not report source locations, so tags are located with a
//! light scan that skips comments and raw-text element bodies. The n-th
//! element named `tr` in document order owns the n-th `<tr` in the source.

use std::collections::{HashMap, VecDeque};
use std::ops::Range;

use crate::html::Element;

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "plaintext", "script", "style", "textarea", "title", "xmp",
];

pub(crate) struct SourceIndex {
    tags: HashMap<String, VecDeque<Range<usize>>>,
}

impl SourceIndex {
    pub(crate) fn new(source: &str) -> Self {
        let lower = source.to_ascii_lowercase();
        let mut tags: HashMap<String, VecDeque<Range<usize>>> = HashMap::new();
        let mut pos = 0;

        while let Some(offset) = lower[pos..].find('<') {
            let start = pos + offset;
            let rest = &lower[start..];
            if rest.starts_with("<!--") {
                pos = rest.find("-->").map_or(lower.len(), |end| start + end + 3);
                continue;
            }
            let Some(name) = tag_name(&rest[1..]) else {
                pos = start + 1;
                continue;
            };
            let end = tag_end(&lower, start + 1 + name.len());
            pos = end;
            if RAW_TEXT_ELEMENTS.contains(&name) {
                let close = format!("</{}", name);
                pos = lower[end..].find(&close).map_or(lower.len(), |p| end + p);
            }
            tags.entry(name.to_string()).or_default().push_back(start..end);
        }

        SourceIndex { tags }
    }

    /// Claim the next unassigned start tag called `name`.
    pub(crate) fn next_start_tag(&mut self, name: &str) -> Option<Range<usize>> {
        self.tags.get_mut(name)?.pop_front()
    }
}

/// Lowercase ASCII tag name at the start of `s`, if `s` opens a start tag.
fn tag_name(s: &str) -> Option<&str> {
    if !s.as_bytes().first()?.is_ascii_alphabetic() {
        return None;
    }
    let len = s.bytes().take_while(u8::is_ascii_alphanumeric).count();
    Some(&s[..len])
}

/// Offset just past the `>` closing the tag whose attributes start at `from`.
fn tag_end(source: &str, from: usize) -> usize {
    let mut quote = None;
    for (i, b) in source.bytes().enumerate().skip(from) {
        match (quote, b) {
            (None, b'"' | b'\'') => quote = Some(b),
            (Some(q), _) if q == b => quote = None,
            (None, b'>') => return i + 1,
            _ => {}
        }
    }
    source.len()
}

/// Byte range of `el` from its start tag through its matching end tag.
/// Falls back to the start tag alone when the end tag was omitted.
pub fn outer_span(source: &str, el: &Element) -> Option<Range<usize>> {
    let start_tag = el.span.clone()?;
    let lower = source.to_ascii_lowercase();
    let open = format!("<{}", el.name);
    let close = format!("</{}", el.name);
    let mut depth = 0usize;
    let mut pos = start_tag.end;

    while let Some(offset) = lower.get(pos..)?.find('<') {
        let at = pos + offset;
        let rest = &lower[at..];
        if rest.starts_with("<!--") {
            pos = rest.find("-->").map_or(lower.len(), |end| at + end + 3);
            continue;
        }
        if rest.starts_with(&close) && is_name_end(rest, close.len()) {
            let end = tag_end(&lower, at + close.len());
            if depth == 0 {
                return Some(start_tag.start..end);
            }
            depth -= 1;
            pos = end;
        } else if rest.starts_with(&open) && is_name_end(rest, open.len()) {
            depth += 1;
            pos = tag_end(&lower, at + open.len());
        } else {
            pos = at + 1;
        }
    }
    Some(start_tag)
}

fn is_name_end(s: &str, at: usize) -> bool {
    s.as_bytes()
        .get(at)
        .is_none_or(|b| !b.is_ascii_alphanumeric())
}
