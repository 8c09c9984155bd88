mod error;
mod shapes;

pub use error::{ImportError, ImportWarning};

use std::ops::Range;

use log::{debug, warn};

use crate::block::{Align, Columns, Content, Document, Layout, Side, Slot};
use crate::html::{Element, outer_span, parse_document};
use crate::options::ImportOptions;
use crate::render::scaffold::{FOOTER_CLASS, PREHEADER_CLASS};
use shapes::Shape;

/// The result of a successful import.
#[derive(Debug, Clone)]
pub struct Imported {
    /// Reconstructed blocks, with fresh identifiers.
    pub document: Document,
    /// Rows that were skipped, in source order.
    pub warnings: Vec<ImportWarning>,
}

/// Rebuild a block document from an exported email.
///
/// The only failure is a document without the main content table; rows that
/// match no known shape are skipped and reported as warnings.
pub fn import_html(source: &str, options: &ImportOptions) -> Result<Imported, ImportError> {
    let fragment = parse_document(source);
    let marker = options.content_width.to_string();
    let main = fragment
        .find(&|el| {
            el.is("table")
                && el
                    .attr("width")
                    .is_some_and(|w| w.trim().trim_end_matches("px") == marker)
        })
        .ok_or_else(|| ImportError::NotATemplate {
            reason: format!("no <table width=\"{}\"> holding the email content", marker),
        })?;

    let mut state = ImportState::new(source, main.span.clone().unwrap_or(0..0));
    for row in shapes::rows_of(main) {
        state.import_row(row, Slot::Root);
    }
    debug!(
        "imported {} block(s) with {} skipped row(s)",
        state.document.len(),
        state.warnings.len()
    );

    Ok(Imported {
        document: state.document,
        warnings: state.warnings,
    })
}

// ---------------------------------------------------------------------------
// Import state
// ---------------------------------------------------------------------------

struct ImportState<'a> {
    source: &'a str,
    /// Reported for rows whose start tag could not be located.
    fallback_span: Range<usize>,
    document: Document,
    warnings: Vec<ImportWarning>,
}

impl<'a> ImportState<'a> {
    fn new(source: &'a str, fallback_span: Range<usize>) -> Self {
        ImportState {
            source,
            fallback_span,
            document: Document::new(),
            warnings: Vec::new(),
        }
    }

    fn import_row(&mut self, row: &Element, slot: Slot) {
        let Some(cell) = shapes::cell_of(row) else {
            self.skip(row, "row has no cell");
            return;
        };
        if cell.has_class(PREHEADER_CLASS) || cell.has_class(FOOTER_CLASS) {
            return;
        }
        if cell.style().get("display") == Some("none") {
            return;
        }

        let layout = cell_layout(cell);
        let index = self.document.children(slot).map(|c| c.len()).unwrap_or(0);

        match shapes::match_cell(cell) {
            Some(Shape::Columns { left, right }) => {
                if slot != Slot::Root {
                    self.skip(row, "two-column layout nested inside a column");
                    return;
                }
                let container = match self.document.insert(slot, index, layout, Content::Columns(Columns::default())) {
                    Ok(id) => id,
                    Err(err) => {
                        self.skip(row, &err.to_string());
                        return;
                    }
                };
                debug!("row at {}: two-column container {}", self.offset(row), container);
                for (side, rows) in [(Side::Left, left), (Side::Right, right)] {
                    for child in rows {
                        self.import_row(child, Slot::Column { container, side });
                    }
                }
            }
            Some(Shape::Leaf { content, font_size }) => {
                let layout = Layout {
                    font_size: font_size.unwrap_or(layout.font_size),
                    ..layout
                };
                let kind = content.kind();
                match self.document.insert(slot, index, layout, content) {
                    Ok(id) => debug!("row at {}: {} block {}", self.offset(row), kind, id),
                    Err(err) => self.skip(row, &err.to_string()),
                }
            }
            None => {
                if cell.significant_children().is_empty() && !cell.children.is_empty() {
                    self.skip(row, "placeholder for an unsupported block");
                } else {
                    self.skip(row, "unrecognized row");
                }
            }
        }
    }

    fn skip(&mut self, row: &Element, reason: &str) {
        let span = outer_span(self.source, row).unwrap_or_else(|| self.fallback_span.clone());
        warn!("skipping row at byte {}: {}", span.start, reason);
        self.warnings.push(ImportWarning {
            message: format!("{}; row skipped", reason),
            span,
        });
    }

    fn offset(&self, row: &Element) -> usize {
        row.span.as_ref().map_or(self.fallback_span.start, |span| span.start)
    }
}

/// Padding, alignment and inherited font size from a row's cell.
fn cell_layout(cell: &Element) -> Layout {
    let style = cell.style();
    let align = cell
        .attr("align")
        .and_then(Align::parse)
        .or_else(|| style.get("text-align").and_then(Align::parse))
        .unwrap_or_default();
    Layout {
        padding: style.px("padding").unwrap_or(0),
        align,
        font_size: style.px("font-size").unwrap_or(Layout::default().font_size),
    }
}
