use scraper::{ElementRef, Html};

use crate::html::source::SourceIndex;
use crate::html::{Element, Fragment, Node};

/// Parse a complete HTML document. Never fails; html5ever recovers from any
/// markup the way browsers do.
pub fn parse_document(source: &str) -> Fragment {
    let html = Html::parse_document(source);
    let mut index = SourceIndex::new(source);
    Fragment {
        nodes: vec![Node::Element(convert(html.root_element(), &mut index))],
    }
}

/// Parse an HTML snippet in body context.
pub fn parse_fragment(source: &str) -> Fragment {
    let html = Html::parse_fragment(source);
    let mut index = SourceIndex::new(source);
    // The fragment root is a synthetic <html> wrapper.
    Fragment {
        nodes: convert_children(html.root_element(), &mut index),
    }
}

/// Re-serialize an HTML snippet the way the parser sees it: entities
/// decoded and re-escaped, void tags and quoting made uniform.
pub fn normalize(source: &str) -> String {
    Html::parse_fragment(source).root_element().inner_html()
}

/// Copy an element and its subtree. Start-tag spans are assigned in
/// document order, which is the order their tags appear in the source.
fn convert(el: ElementRef<'_>, index: &mut SourceIndex) -> Element {
    let value = el.value();
    let name = value.name().to_ascii_lowercase();
    let span = index.next_start_tag(&name);
    let attrs = value
        .attrs()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
        .collect();
    Element {
        name,
        attrs,
        children: convert_children(el, index),
        span,
        inner_html: el.inner_html(),
    }
}

fn convert_children(el: ElementRef<'_>, index: &mut SourceIndex) -> Vec<Node> {
    let mut children = Vec::new();
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            children.push(Node::Element(convert(child_el, index)));
        } else if let Some(text) = child.value().as_text() {
            let text: &str = text;
            children.push(Node::Text(text.to_string()));
        } else if let Some(comment) = child.value().as_comment() {
            let comment: &str = comment;
            children.push(Node::Comment(comment.to_string()));
        }
    }
    children
}
