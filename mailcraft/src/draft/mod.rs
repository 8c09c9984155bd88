//! Compose a block document from a Markdown draft.
//!
//! Paragraphs become text blocks, headings become bold text blocks, lists
//! become list blocks. A paragraph holding nothing but an image or a link
//! becomes an image or link block; a link titled `button` becomes a button.

use std::ops::Range;

use html_escape::encode_text;
use log::debug;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd, html};

use crate::block::{
    ButtonBlock, Content, Document, DocumentError, ImageBlock, Layout, LinkBlock, ListBlock, Slot,
    TextBlock,
};

type Events<'e> = [(Event<'e>, Range<usize>)];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build a document from Markdown source. Constructs without a block
/// counterpart (rules, raw HTML blocks, tables) are dropped.
pub fn draft_document(source: &str) -> Result<Document, DocumentError> {
    let options = Options::ENABLE_STRIKETHROUGH;
    let parser = CmarkParser::new_ext(source, options);
    let events: Vec<(Event<'_>, Range<usize>)> = parser.into_offset_iter().collect();

    let mut state = DraftState::new();
    state.process_events(&events)?;
    debug!("drafted {} block(s) from markdown", state.document.len());
    Ok(state.document)
}

/// Font size for a heading level.
pub fn heading_size(level: HeadingLevel) -> u32 {
    match level {
        HeadingLevel::H1 => 28,
        HeadingLevel::H2 => 24,
        HeadingLevel::H3 => 20,
        _ => 18,
    }
}

// ---------------------------------------------------------------------------
// Draft state
// ---------------------------------------------------------------------------

struct DraftState {
    document: Document,
}

impl DraftState {
    fn new() -> Self {
        DraftState {
            document: Document::new(),
        }
    }

    fn process_events(&mut self, events: &Events<'_>) -> Result<(), DocumentError> {
        let mut i = 0;

        while i < events.len() {
            let (ref ev, ref range) = events[i];

            match ev {
                Event::Start(Tag::Heading { level, .. }) => {
                    let size = heading_size(*level);
                    i += 1;
                    let inlines = collect_until(events, &mut i, |e| matches!(e, TagEnd::Heading(_)));
                    let content = Content::Text(TextBlock {
                        content: inline_html(inlines),
                        bold: true,
                        ..TextBlock::default()
                    });
                    self.append(content, size)?;
                }

                Event::Start(Tag::Paragraph) => {
                    i += 1;
                    let inlines = collect_until(events, &mut i, |e| matches!(e, TagEnd::Paragraph));
                    let content = paragraph_content(inlines);
                    debug!("paragraph at {}: {}", range.start, content.kind());
                    self.append(content, Layout::default().font_size)?;
                }

                Event::Start(Tag::List(start)) => {
                    let ordered = start.is_some();
                    i += 1;
                    let items = collect_items(events, &mut i);
                    self.append(Content::List(ListBlock { items, ordered }), Layout::default().font_size)?;
                }

                Event::Start(Tag::CodeBlock(_)) => {
                    i += 1;
                    let code: String = collect_until(events, &mut i, |e| matches!(e, TagEnd::CodeBlock))
                        .into_iter()
                        .filter_map(|ev| match ev {
                            Event::Text(s) => Some(s.into_string()),
                            _ => None,
                        })
                        .collect();
                    let content = Content::text(format!(
                        "<code>{}</code>",
                        encode_text(code.trim_end()).replace('\n', "<br />")
                    ));
                    self.append(content, Layout::default().font_size)?;
                }

                _ => {
                    i += 1;
                }
            }
        }

        Ok(())
    }

    fn append(&mut self, content: Content, font_size: u32) -> Result<(), DocumentError> {
        let layout = Layout {
            font_size,
            ..Layout::default()
        };
        let index = self.document.roots().len();
        self.document.insert(Slot::Root, index, layout, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Collect events up to the end tag matching the already-consumed start tag.
/// Leaves `i` past the end tag.
fn collect_until<'e>(
    events: &Events<'e>,
    i: &mut usize,
    is_end: impl Fn(&TagEnd) -> bool,
) -> Vec<Event<'e>> {
    let mut out = Vec::new();
    let mut depth = 0usize;

    while *i < events.len() {
        let (ref ev, _) = events[*i];
        *i += 1;
        match ev {
            Event::End(tag_end) if depth == 0 && is_end(tag_end) => break,
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        out.push(ev.clone());
    }

    out
}

/// Items of a list whose start tag was consumed, each as inline HTML.
/// Loose-list paragraphs are unwrapped.
fn collect_items(events: &Events<'_>, i: &mut usize) -> Vec<String> {
    let mut items = Vec::new();

    while *i < events.len() {
        let (ref ev, _) = events[*i];
        match ev {
            Event::End(TagEnd::List(_)) => {
                *i += 1;
                break;
            }
            Event::Start(Tag::Item) => {
                *i += 1;
                let inner = collect_until(events, i, |e| matches!(e, TagEnd::Item));
                let inner: Vec<Event<'_>> = inner
                    .into_iter()
                    .filter(|e| !matches!(e, Event::Start(Tag::Paragraph) | Event::End(TagEnd::Paragraph)))
                    .collect();
                items.push(inline_html(inner));
            }
            _ => {
                *i += 1;
            }
        }
    }

    items
}

fn inline_html(events: Vec<Event<'_>>) -> String {
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out.trim().to_string()
}

/// An image-only or link-only paragraph maps to its own block kind.
fn paragraph_content(inlines: Vec<Event<'_>>) -> Content {
    if let Some(content) = sole_element_content(&inlines) {
        return content;
    }
    Content::Text(TextBlock {
        content: inline_html(inlines),
        ..TextBlock::default()
    })
}

fn sole_element_content(inlines: &[Event<'_>]) -> Option<Content> {
    match sole_wrapped(inlines)? {
        (Tag::Image { dest_url, .. }, inner) => Some(Content::Image(ImageBlock {
            src: dest_url.to_string(),
            alt: plain_text(inner),
            ..ImageBlock::default()
        })),
        (Tag::Link { dest_url, title, .. }, inner) if title.eq_ignore_ascii_case("button") => {
            Some(Content::Button(ButtonBlock {
                label: plain_text(inner),
                href: dest_url.to_string(),
                ..ButtonBlock::default()
            }))
        }
        (Tag::Link { dest_url, .. }, inner) => Some(Content::Link(LinkBlock {
            href: dest_url.to_string(),
            text: plain_text(inner),
            ..LinkBlock::default()
        })),
        _ => None,
    }
}

/// If the whole inline sequence is one element, its start tag and contents.
fn sole_wrapped<'a, 'e>(inlines: &'a [Event<'e>]) -> Option<(&'a Tag<'e>, &'a [Event<'e>])> {
    let (Some(Event::Start(tag)), Some([inner @ .., Event::End(_)])) = (inlines.first(), inlines.get(1..))
    else {
        return None;
    };
    // The final end tag must close the first start tag, not a later one.
    let mut depth = 0usize;
    for ev in inner {
        match ev {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return None,
            Event::End(_) => depth -= 1,
            _ => {}
        }
    }
    Some((tag, inner))
}

fn plain_text(events: &[Event<'_>]) -> String {
    let mut out = String::new();
    for ev in events {
        match ev {
            Event::Text(s) | Event::Code(s) => out.push_str(s),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            _ => {}
        }
    }
    out.trim().to_string()
}
