//! Property-based tests for export and import over generated documents.

use html_escape::encode_text;
use mailcraft::block::{ButtonBlock, ImageBlock, LinkBlock, ListBlock, TextBlock};
use mailcraft::render::preheader;
use mailcraft::{
    Align, BlockKind, Content, Document, ExportOptions, ImportOptions, Layout, Side, Slot,
    import_html, render_email, render_rows,
};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::{Index, select};

#[derive(Debug, Clone)]
enum Row {
    Leaf(Layout, Content),
    Columns(Layout, Vec<(Layout, Content)>, Vec<(Layout, Content)>),
}

/// Unicode text with whitespace at either end.
fn loose_text() -> impl Strategy<Value = String> {
    "[ \t\n]{0,2}\\PC{0,24}[ \t\n]{0,2}"
}

fn colour() -> impl Strategy<Value = String> {
    select(vec!["#333333", "#ff0000", "#00aa00", "red", "navy"]).prop_map(str::to_string)
}

fn url() -> impl Strategy<Value = String> {
    "https://[a-z]{1,8}\\.example\\.com/[a-z0-9/]{0,12}(\\?[a-z]=[0-9]&[a-z]=[0-9])?"
}

fn layout() -> impl Strategy<Value = Layout> {
    (
        0u32..=40,
        select(vec![Align::Left, Align::Center, Align::Right]),
        8u32..=48,
    )
        .prop_map(|(padding, align, font_size)| Layout {
            padding,
            align,
            font_size,
        })
}

fn leaf() -> impl Strategy<Value = Content> {
    prop_oneof![
        (loose_text(), colour(), any::<bool>()).prop_map(|(text, color, bold)| {
            Content::Text(TextBlock {
                content: encode_text(&text).into_owned(),
                color,
                bold,
            })
        }),
        (
            url(),
            loose_text(),
            proptest::option::of(1u32..800),
            proptest::option::of(1u32..800),
            0u32..20,
        )
            .prop_map(|(src, alt, width, height, border_radius)| {
                Content::Image(ImageBlock {
                    src,
                    alt,
                    width,
                    height,
                    border_radius,
                })
            }),
        (loose_text(), url(), colour(), colour()).prop_map(|(label, href, background, color)| {
            Content::Button(ButtonBlock {
                label,
                href,
                background,
                color,
            })
        }),
        (vec(loose_text(), 0..4), any::<bool>()).prop_map(|(items, ordered)| {
            Content::List(ListBlock {
                items: items.iter().map(|item| encode_text(item).into_owned()).collect(),
                ordered,
            })
        }),
        (url(), loose_text(), colour(), any::<bool>()).prop_map(|(href, text, color, underline)| {
            Content::Link(LinkBlock {
                href,
                text,
                color,
                underline,
            })
        }),
    ]
}

fn row() -> impl Strategy<Value = Row> {
    prop_oneof![
        3 => (layout(), leaf()).prop_map(|(layout, content)| Row::Leaf(layout, content)),
        1 => (
            layout(),
            vec((layout(), leaf()), 0..3),
            vec((layout(), leaf()), 0..3),
        )
            .prop_map(|(layout, left, right)| Row::Columns(layout, left, right)),
    ]
}

fn build(rows: &[Row]) -> Document {
    let mut doc = Document::new();
    for row in rows {
        let index = doc.roots().len();
        match row {
            Row::Leaf(layout, content) => {
                doc.insert(Slot::Root, index, layout.clone(), content.clone())
                    .unwrap();
            }
            Row::Columns(layout, left, right) => {
                let container = doc
                    .insert(
                        Slot::Root,
                        index,
                        layout.clone(),
                        Content::default_for(BlockKind::Columns),
                    )
                    .unwrap();
                for (side, blocks) in [(Side::Left, left), (Side::Right, right)] {
                    let slot = Slot::Column { container, side };
                    for (i, (layout, content)) in blocks.iter().enumerate() {
                        doc.insert(slot, i, layout.clone(), content.clone()).unwrap();
                    }
                }
            }
        }
    }
    doc
}

/// Split rendered rows into top-level `<tr>` elements, each with its newline.
fn root_rows(html: &str) -> Vec<&str> {
    let bytes = html.as_bytes();
    let mut rows = Vec::new();
    let (mut depth, mut start, mut i) = (0usize, 0usize, 0usize);
    while i < bytes.len() {
        if bytes[i..].starts_with(b"<tr") {
            depth += 1;
            i += 3;
        } else if bytes[i..].starts_with(b"</tr>") {
            depth -= 1;
            i += 5;
            if depth == 0 {
                let end = (i + 1).min(bytes.len());
                rows.push(&html[start..end]);
                start = end;
                i = end;
            }
        } else {
            i += 1;
        }
    }
    rows
}

proptest! {
    #[test]
    fn export_then_import_is_equivalent(rows in vec(row(), 0..6)) {
        let doc = build(&rows);
        let html = render_email(&doc, &ExportOptions::default());
        let imported = import_html(&html, &ImportOptions::default()).unwrap();

        prop_assert_eq!(imported.warnings, vec![]);
        prop_assert!(
            imported.document.equivalent(&doc),
            "imported {:#?}\nexpected {:#?}",
            imported.document,
            doc
        );
    }

    #[test]
    fn reordering_moves_exactly_one_row(
        rows in vec(row(), 1..6),
        from in any::<Index>(),
        to in any::<Index>(),
    ) {
        let mut doc = build(&rows);
        let before = render_rows(&doc);
        let mut expected = root_rows(&before);
        prop_assert_eq!(expected.len(), doc.roots().len());

        let from = from.index(expected.len());
        let to = to.index(expected.len());
        let id = doc.roots()[from];
        doc.move_block(id, Slot::Root, to).unwrap();

        let moved = expected.remove(from);
        expected.insert(to, moved);
        prop_assert_eq!(render_rows(&doc), expected.concat());
    }

    #[test]
    fn rendering_raw_field_values_never_panics(
        content in "\\PC*",
        label in "\\PC*",
        colour in "\\PC*",
        background in "\\PC*",
        max_chars in 0usize..200,
    ) {
        let mut doc = Document::new();
        doc.push(Content::Text(TextBlock {
            content,
            color: colour.clone(),
            bold: false,
        }))
        .unwrap();
        doc.push(Content::Button(ButtonBlock {
            label,
            background: colour.clone(),
            color: colour,
            ..ButtonBlock::default()
        }))
        .unwrap();
        let options = ExportOptions {
            background,
            preheader_length: max_chars,
            ..ExportOptions::default()
        };

        let html = render_email(&doc, &options);
        prop_assert!(preheader(&doc, max_chars).chars().count() <= max_chars);
        if let Ok(imported) = import_html(&html, &ImportOptions::default()) {
            for warning in &imported.warnings {
                prop_assert!(html.get(warning.span.clone()).is_some());
            }
        }
    }

    #[test]
    fn importing_arbitrary_markup_never_panics(
        source in "(<(/)?(table|tbody|tr|td|p|a|ul|li|div|style)( width=\"600\")?>|<!--|-->|[^<]{0,8}){0,24}",
    ) {
        if let Ok(imported) = import_html(&source, &ImportOptions::default()) {
            for warning in &imported.warnings {
                prop_assert!(source.get(warning.span.clone()).is_some());
            }
        }
    }
}
