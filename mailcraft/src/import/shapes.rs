//! Recognizers for the row shapes the exporter writes.
//!
//! Every recognizer takes the `<td>` of one row and either returns the block
//! it encodes or `None`. Leaves may sit behind any number of wrappers
//! (`<div>`, `<center>`, single-cell tables).

use crate::block::{ButtonBlock, Content, ImageBlock, LinkBlock, ListBlock, TextBlock};
use crate::html::style::px;
use crate::html::{Element, Node};

/// Inline elements allowed in a bare-text cell.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "b", "br", "code", "em", "font", "i", "s", "small", "span", "strong", "sub", "sup", "u",
];

/// What one row cell decodes to.
#[derive(Debug)]
pub(crate) enum Shape<'a> {
    /// A two-column container; each side lists its rows in order.
    Columns {
        left: Vec<&'a Element>,
        right: Vec<&'a Element>,
    },
    /// A leaf block. `font_size` is set when the leaf element carries its own.
    Leaf {
        content: Content,
        font_size: Option<u32>,
    },
}

/// The `<tr>` rows of a table, looking through `tbody`/`thead`/`tfoot`.
pub(crate) fn rows_of(table: &Element) -> Vec<&Element> {
    let mut rows = Vec::new();
    for child in table.elements() {
        match child.name.as_str() {
            "tr" => rows.push(child),
            "tbody" | "thead" | "tfoot" => rows.extend(child.elements().filter(|el| el.is("tr"))),
            _ => {}
        }
    }
    rows
}

/// The first cell of a row.
pub(crate) fn cell_of(row: &Element) -> Option<&Element> {
    row.elements().find(|el| el.is("td") || el.is("th"))
}

pub(crate) fn match_cell(cell: &Element) -> Option<Shape<'_>> {
    match cell.sole_element() {
        Some(el) => match_element(el),
        None if has_inline_text(cell) => Some(Shape::Leaf {
            content: Content::Text(TextBlock {
                content: cell.inner_html().trim().to_string(),
                color: cell
                    .style()
                    .get("color")
                    .unwrap_or(&TextBlock::default().color)
                    .to_string(),
                bold: is_bold(cell),
            }),
            font_size: None,
        }),
        None => None,
    }
}

fn match_element(el: &Element) -> Option<Shape<'_>> {
    match el.name.as_str() {
        "table" => columns(el)
            .or_else(|| button(el))
            .or_else(|| single_cell(el).and_then(match_cell)),
        "div" | "center" => match_cell(el),
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some(text(el)),
        "img" => Some(image(el)),
        "ul" | "ol" => Some(list(el)),
        "a" => Some(link(el)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// One row holding two `width="50%"` cells, each empty or wrapping a table
/// of rows.
fn columns(table: &Element) -> Option<Shape<'_>> {
    let [row] = rows_of(table)[..] else {
        return None;
    };
    let cells: Vec<&Element> = row.elements().filter(|el| el.is("td")).collect();
    let [left, right] = cells[..] else {
        return None;
    };
    if !is_half(left) || !is_half(right) {
        return None;
    }
    Some(Shape::Columns {
        left: column_rows(left)?,
        right: column_rows(right)?,
    })
}

fn is_half(cell: &Element) -> bool {
    cell.attr("width").is_some_and(|w| w.trim() == "50%")
        || cell.style().get("width") == Some("50%")
}

fn column_rows(cell: &Element) -> Option<Vec<&Element>> {
    if cell.significant_children().is_empty() {
        return Some(Vec::new());
    }
    let inner = cell.sole_element().filter(|el| el.is("table"))?;
    Some(rows_of(inner))
}

/// The only cell of a one-row, one-cell table.
fn single_cell(table: &Element) -> Option<&Element> {
    let [row] = rows_of(table)[..] else {
        return None;
    };
    let mut cells = row.elements().filter(|el| el.is("td") || el.is("th"));
    match (cells.next(), cells.next()) {
        (Some(cell), None) => Some(cell),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Leaves
// ---------------------------------------------------------------------------

/// A lone anchor in a single cell, with a background colour on either.
fn button(table: &Element) -> Option<Shape<'static>> {
    let cell = single_cell(table)?;
    let anchor = cell.sole_element().filter(|el| el.is("a"))?;
    let cell_style = cell.style();
    let anchor_style = anchor.style();
    let background = cell
        .attr("bgcolor")
        .or_else(|| cell_style.get("background-color"))
        .or_else(|| anchor_style.get("background-color"))?;
    let defaults = ButtonBlock::default();
    Some(Shape::Leaf {
        content: Content::Button(ButtonBlock {
            label: anchor.text_content(),
            href: anchor.attr("href").unwrap_or(&defaults.href).to_string(),
            background: background.to_string(),
            color: anchor_style
                .get("color")
                .unwrap_or(&defaults.color)
                .to_string(),
        }),
        font_size: anchor_style.px("font-size"),
    })
}

fn text(el: &Element) -> Shape<'static> {
    let style = el.style();
    Shape::Leaf {
        content: Content::Text(TextBlock {
            content: el.inner_html().to_string(),
            color: style
                .get("color")
                .unwrap_or(&TextBlock::default().color)
                .to_string(),
            bold: is_bold(el) || el.name.starts_with('h'),
        }),
        font_size: style.px("font-size"),
    }
}

fn image(el: &Element) -> Shape<'static> {
    let style = el.style();
    let dimension = |prop: &str| style.px(prop).or_else(|| el.attr(prop).and_then(px));
    let defaults = ImageBlock::default();
    Shape::Leaf {
        content: Content::Image(ImageBlock {
            src: el.attr("src").unwrap_or(&defaults.src).to_string(),
            alt: el.attr("alt").unwrap_or_default().to_string(),
            width: dimension("width"),
            height: dimension("height"),
            border_radius: style.px("border-radius").unwrap_or(0),
        }),
        font_size: None,
    }
}

fn list(el: &Element) -> Shape<'static> {
    let items = el
        .elements()
        .filter(|item| item.is("li"))
        .map(|item| item.inner_html().to_string())
        .collect();
    Shape::Leaf {
        content: Content::List(ListBlock {
            items,
            ordered: el.is("ol"),
        }),
        font_size: el.style().px("font-size"),
    }
}

fn link(el: &Element) -> Shape<'static> {
    let style = el.style();
    let defaults = LinkBlock::default();
    Shape::Leaf {
        content: Content::Link(LinkBlock {
            href: el.attr("href").unwrap_or(&defaults.href).to_string(),
            text: el.text_content(),
            color: style.get("color").unwrap_or(&defaults.color).to_string(),
            underline: !style
                .get("text-decoration")
                .is_some_and(|d| d.split_whitespace().any(|d| d == "none")),
        }),
        font_size: style.px("font-size"),
    }
}

fn is_bold(el: &Element) -> bool {
    match el.style().get("font-weight") {
        Some("bold") | Some("bolder") => true,
        Some(weight) => weight.parse::<u32>().is_ok_and(|w| w >= 600),
        None => false,
    }
}

/// Text, possibly with inline markup, and nothing block-level.
fn has_inline_text(cell: &Element) -> bool {
    let mut has_text = false;
    for node in cell.significant_children() {
        match node {
            Node::Text(_) => has_text = true,
            Node::Element(el) if INLINE_ELEMENTS.contains(&el.name.as_str()) => {}
            _ => return false,
        }
    }
    has_text
}
