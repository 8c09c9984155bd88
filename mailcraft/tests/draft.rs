use mailcraft::block::{ButtonBlock, ImageBlock, LinkBlock, ListBlock, TextBlock};
use mailcraft::draft::draft_document;
use mailcraft::{Content, ExportOptions, ImportOptions, import_html, render_email};
use pretty_assertions::assert_eq;

const DRAFT: &str = r#"# Spring sale

Hello **friends**, see [our shop](https://shop.example.com).

![Banner](https://cdn.example.com/banner.png)

[Shop now](https://shop.example.com "button")

[Read the blog](https://blog.example.com)

- one
- *two*

1. first
2. second

```
let x = 1 < 2;
```

---
"#;

#[test]
fn markdown_maps_to_blocks() {
    let doc = draft_document(DRAFT).unwrap();
    let contents: Vec<Content> = doc.blocks().map(|b| b.content.clone()).collect();

    assert_eq!(
        contents,
        vec![
            Content::Text(TextBlock {
                content: "Spring sale".to_string(),
                bold: true,
                ..TextBlock::default()
            }),
            Content::text(
                "Hello <strong>friends</strong>, see <a href=\"https://shop.example.com\">our shop</a>."
            ),
            Content::Image(ImageBlock {
                src: "https://cdn.example.com/banner.png".to_string(),
                alt: "Banner".to_string(),
                ..ImageBlock::default()
            }),
            Content::Button(ButtonBlock {
                label: "Shop now".to_string(),
                href: "https://shop.example.com".to_string(),
                ..ButtonBlock::default()
            }),
            Content::Link(LinkBlock {
                href: "https://blog.example.com".to_string(),
                text: "Read the blog".to_string(),
                ..LinkBlock::default()
            }),
            Content::List(ListBlock {
                items: vec!["one".to_string(), "<em>two</em>".to_string()],
                ordered: false,
            }),
            Content::List(ListBlock {
                items: vec!["first".to_string(), "second".to_string()],
                ordered: true,
            }),
            Content::text("<code>let x = 1 &lt; 2;</code>"),
        ]
    );
}

#[test]
fn headings_are_sized_by_level() {
    let doc = draft_document("# One\n\n## Two\n\n### Three\n\n#### Four\n\nbody\n").unwrap();
    let sizes: Vec<u32> = doc.blocks().map(|b| b.layout.font_size).collect();
    assert_eq!(sizes, vec![28, 24, 20, 18, 16]);
}

#[test]
fn drafted_document_survives_export() {
    let doc = draft_document(DRAFT).unwrap();
    let html = render_email(&doc, &ExportOptions::default());
    let imported = import_html(&html, &ImportOptions::default()).unwrap();
    assert!(imported.warnings.is_empty());
    assert!(imported.document.equivalent(&doc));
}

#[test]
fn empty_draft_is_empty_document() {
    assert!(draft_document("").unwrap().is_empty());
    assert!(draft_document("---\n").unwrap().is_empty());
}
