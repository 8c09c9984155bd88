//! A small owned view of parsed HTML.
//!
//! Parsing is done by `scraper` (html5ever). The resulting DOM is copied into
//! [`Node`]/[`Element`] values that the importer pattern-matches on, with
//! start-tag positions recovered from the source for diagnostics.

mod source;
pub mod style;
mod tree;

use std::ops::Range;

pub use source::outer_span;
pub use style::Style;
pub use tree::{normalize, parse_document, parse_fragment};

/// A node of a parsed HTML document. Text is entity-decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Whitespace-only text and comments carry no structure.
    pub fn is_insignificant(&self) -> bool {
        match self {
            Node::Element(_) => false,
            Node::Text(text) => text.trim().is_empty(),
            Node::Comment(_) => true,
        }
    }
}

/// An element with lowercased tag and attribute names.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
    /// Byte range of the start tag in the source. `None` for elements the
    /// parser implied (`tbody`, `html`, ...).
    pub span: Option<Range<usize>>,
    /// Serialized children.
    inner_html: String,
}

impl Element {
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    pub fn style(&self) -> Style {
        Style::parse(self.attr("style").unwrap_or(""))
    }

    /// Element children, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Children that matter structurally (no whitespace text, no comments).
    pub fn significant_children(&self) -> Vec<&Node> {
        self.children.iter().filter(|n| !n.is_insignificant()).collect()
    }

    /// The only significant child, if there is exactly one and it is an element.
    pub fn sole_element(&self) -> Option<&Element> {
        match self.significant_children().as_slice() {
            [Node::Element(el)] => Some(el),
            _ => None,
        }
    }

    /// First descendant (depth-first, pre-order) matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        find_in(&self.children, pred)
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// The element's children as normalized HTML.
    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }
}

fn find_in<'a>(nodes: &'a [Node], pred: &dyn Fn(&Element) -> bool) -> Option<&'a Element> {
    for el in nodes.iter().filter_map(Node::as_element) {
        if pred(el) {
            return Some(el);
        }
        if let Some(found) = find_in(&el.children, pred) {
            return Some(found);
        }
    }
    None
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Comment(_) => {}
        }
    }
}

/// Top-level nodes of a parsed document or fragment.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// First element anywhere in the fragment matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        find_in(&self.nodes, pred)
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }
}

/// Strip tags from an HTML snippet, decode entities, and collapse whitespace.
pub fn plain_text(html: &str) -> String {
    parse_fragment(html)
        .text_content()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
