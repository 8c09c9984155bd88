use mailcraft::block::{ButtonBlock, ImageBlock, LinkBlock, ListBlock, TextBlock};
use mailcraft::render::{preheader, tracking_pixel_url};
use mailcraft::{Align, Content, Document, ExportOptions, Layout, Side, Slot, render_email, render_rows};
use pretty_assertions::assert_eq;

fn body_rows(html: &str) -> Vec<&str> {
    html.lines()
        .filter(|l| l.starts_with("<tr><td align="))
        .collect()
}

#[test]
fn single_text_block_email() {
    let doc = Document::from_json(
        r#"{"blocks":[{"kind":"text","content":"Hi","layout":{"padding":10,"align":"left","fontSize":16}}]}"#,
    )
    .unwrap();
    let html = render_email(&doc, &ExportOptions::default());

    let rows = body_rows(&html);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].starts_with(r#"<tr><td align="left" style="padding:10px;">"#));
    assert!(rows[0].contains(r#"font-size:16px;"#));
    assert!(rows[0].contains(r#";">Hi</p></td></tr>"#));

    assert!(html.contains(r#"class="mc-preheader""#));
    assert!(html.contains(">Hi</td></tr>"));
    assert!(html.contains(r#"class="mc-footer""#));
    assert!(html.contains(
        "http://localhost:4000/track-open?email={{email}}&amp;campaignId={{campaignId}}&amp;subject={{subject}}&amp;sentAt={{sentAt}}"
    ));
    assert!(html.contains(r#"<table role="presentation" border="0" cellpadding="0" cellspacing="0" width="600""#));
}

#[test]
fn text_row_exact_markup() {
    let mut doc = Document::new();
    doc.push(Content::text("Hello <a href=\"https://example.com\">there</a>"))
        .unwrap();
    assert_eq!(
        render_rows(&doc),
        "<tr><td align=\"left\" style=\"padding:10px;\"><p style=\"margin:0;font-size:16px;line-height:1.5;color:#333333;font-weight:normal;\">Hello <a href=\"https://example.com\">there</a></p></td></tr>\n"
    );
}

#[test]
fn image_alignment_uses_margins() {
    let mut doc = Document::new();
    let image = Content::Image(ImageBlock {
        src: "https://cdn.example.com/a.png?x=1&y=2".to_string(),
        alt: "Logo".to_string(),
        width: Some(200),
        height: None,
        border_radius: 8,
    });
    for align in [Align::Left, Align::Center, Align::Right] {
        let layout = Layout {
            align,
            ..Layout::default()
        };
        doc.insert(Slot::Root, doc.roots().len(), layout, image.clone())
            .unwrap();
    }
    let html = render_rows(&doc);
    let rows: Vec<&str> = html.lines().collect();

    assert!(rows[0].contains("margin:0;\""));
    assert!(rows[1].contains("margin:0 auto;"));
    assert!(rows[2].contains("margin-left:auto;"));
    assert!(rows[0].contains(r#"src="https://cdn.example.com/a.png?x=1&amp;y=2""#));
    assert!(rows[0].contains(r#" width="200" "#));
    assert!(rows[0].contains("width:200px;height:auto;border-radius:8px;"));
    assert!(rows[0].starts_with(r#"<tr><td align="left" style="padding:10px;font-size:16px;">"#));
}

#[test]
fn button_is_a_nested_table() {
    let mut doc = Document::new();
    doc.push(Content::Button(ButtonBlock {
        label: "Buy <now>".to_string(),
        href: "https://shop.example.com".to_string(),
        background: "#ff0000".to_string(),
        color: "#000000".to_string(),
    }))
    .unwrap();
    let html = render_rows(&doc);
    assert!(html.contains(r##"<td align="center" bgcolor="#ff0000""##));
    assert!(html.contains(r#"<a href="https://shop.example.com" target="_blank""#));
    assert!(html.contains("color:#000000;"));
    assert!(html.contains(">Buy &lt;now&gt;</a></td></tr></table>"));
}

#[test]
fn list_and_link() {
    let mut doc = Document::new();
    doc.push(Content::List(ListBlock {
        items: vec!["One".to_string(), "<b>Two</b>".to_string()],
        ordered: true,
    }))
    .unwrap();
    doc.push(Content::Link(LinkBlock {
        href: "https://example.com".to_string(),
        text: "Read more".to_string(),
        color: "#123456".to_string(),
        underline: false,
    }))
    .unwrap();
    let html = render_rows(&doc);
    assert!(html.contains("<ol style=\"margin:0;padding-left:20px;font-size:16px;line-height:1.5;\"><li>One</li><li><b>Two</b></li></ol>"));
    assert!(html.contains("color:#123456;text-decoration:none;\">Read more</a>"));
}

#[test]
fn empty_columns_render_two_empty_cells() {
    let mut doc = Document::new();
    doc.push(Content::default_for(mailcraft::BlockKind::Columns))
        .unwrap();
    let html = render_rows(&doc);
    assert_eq!(html.matches(r#"<td width="50%" valign="top">"#).count(), 2);
    assert_eq!(html.matches("<table").count(), 3);
    assert_eq!(html.matches("</table>").count(), 3);
    assert_eq!(html.matches("<tr>").count(), 2);
}

#[test]
fn columns_render_children_in_their_cells() {
    let mut doc = Document::new();
    let container = doc
        .push(Content::default_for(mailcraft::BlockKind::Columns))
        .unwrap();
    let left = Slot::Column {
        container,
        side: Side::Left,
    };
    let right = Slot::Column {
        container,
        side: Side::Right,
    };
    doc.insert(left, 0, Layout::default(), Content::text("L")).unwrap();
    doc.insert(right, 0, Layout::default(), Content::text("R1")).unwrap();
    doc.insert(right, 1, Layout::default(), Content::text("R2")).unwrap();

    let html = render_rows(&doc);
    let l = html.find(">L</p>").unwrap();
    let r1 = html.find(">R1</p>").unwrap();
    let r2 = html.find(">R2</p>").unwrap();
    let split = html.rfind(r#"<td width="50%""#).unwrap();
    assert!(l < split && split < r1 && r1 < r2);
}

#[test]
fn unknown_kind_renders_as_comment() {
    let doc = Document::from_json(r#"{"blocks":[{"kind":"video","src":"<script>alert(1)</script>"}]}"#)
        .unwrap();
    let html = render_rows(&doc);
    assert_eq!(html, "<tr><td><!-- unsupported block b1 --></td></tr>\n");
    assert!(!html.contains("<script"));
}

#[test]
fn reordering_reorders_rows_only() {
    let mut doc = Document::new();
    let a = doc.push(Content::text("A")).unwrap();
    let b = doc.push(Content::text("B")).unwrap();
    let before: Vec<String> = render_rows(&doc).lines().map(str::to_string).collect();

    doc.move_block(b, Slot::Root, 0).unwrap();
    let after: Vec<String> = render_rows(&doc).lines().map(str::to_string).collect();
    assert_eq!(after, vec![before[1].clone(), before[0].clone()]);
    assert_eq!(doc.roots(), &[b, a]);
}

#[test]
fn preheader_strips_and_truncates() {
    let mut doc = Document::new();
    doc.push(Content::default_for(mailcraft::BlockKind::Image))
        .unwrap();
    doc.push(Content::text("  <b>Big</b>   news &amp; more  ")).unwrap();
    assert_eq!(preheader(&doc, 100), "Big news & more");
    assert_eq!(preheader(&doc, 4), "Big");
    assert_eq!(preheader(&Document::new(), 100), "");
}

#[test]
fn preheader_is_escaped_in_email() {
    let mut doc = Document::new();
    doc.push(Content::Text(TextBlock {
        content: "1 &lt; 2".to_string(),
        ..TextBlock::default()
    }))
    .unwrap();
    let html = render_email(&doc, &ExportOptions::default());
    assert!(html.contains("mso-hide:all;\">1 &lt; 2</td></tr>"));
}

#[test]
fn tracking_url_keeps_existing_query() {
    assert_eq!(
        tracking_pixel_url("https://t.example.com/o?src=mail"),
        "https://t.example.com/o?src=mail&email={{email}}&campaignId={{campaignId}}&subject={{subject}}&sentAt={{sentAt}}"
    );
}

#[test]
fn unsubscribe_link_only_when_configured() {
    let doc = Document::new();
    let plain = render_email(&doc, &ExportOptions::default());
    assert!(!plain.contains("Unsubscribe"));

    let options = ExportOptions {
        unsubscribe_url: Some("https://example.com/unsub".to_string()),
        ..ExportOptions::default()
    };
    let html = render_email(&doc, &options);
    assert!(html.contains(
        r#"href="https://example.com/unsub?email={{email}}&amp;campaignId={{campaignId}}""#
    ));
}

#[test]
fn non_ascii_text_in_preheader_and_rows() {
    let mut doc = Document::new();
    doc.push(Content::text("<b>Grüße</b> aus Köln: Ärger über Öl ☕")).unwrap();
    doc.push(Content::Button(ButtonBlock {
        label: "日本語のボタン".to_string(),
        ..ButtonBlock::default()
    }))
    .unwrap();

    assert_eq!(preheader(&doc, 5), "Grüße");
    assert_eq!(preheader(&doc, 100), "Grüße aus Köln: Ärger über Öl ☕");

    let html = render_email(&doc, &ExportOptions::default());
    assert!(html.contains("mso-hide:all;\">Grüße aus Köln: Ärger über Öl ☕</td></tr>"));
    assert!(html.contains(">日本語のボタン</a>"));
}

#[test]
fn colour_values_cannot_add_declarations() {
    let mut doc = Document::new();
    doc.push(Content::Text(TextBlock {
        content: "Hi".to_string(),
        color: "red;display:none".to_string(),
        bold: true,
    }))
    .unwrap();
    doc.push(Content::Button(ButtonBlock {
        background: "#00f}body{display:none".to_string(),
        color: " #fff ; position:fixed".to_string(),
        ..ButtonBlock::default()
    }))
    .unwrap();
    doc.push(Content::Link(LinkBlock {
        color: "blue{".to_string(),
        ..LinkBlock::default()
    }))
    .unwrap();
    let options = ExportOptions {
        background: "#eee;background-image:url(x)".to_string(),
        ..ExportOptions::default()
    };
    let html = render_email(&doc, &options);

    assert!(html.contains("color:red;font-weight:bold;"));
    assert!(!html.contains("display:none\""));
    assert!(!html.contains("display:none;font-weight"));
    assert!(html.contains(r##"bgcolor="#00f""##));
    assert!(!html.contains("body{display"));
    assert!(html.contains("color:#fff;background-color:#00f;"));
    assert!(!html.contains("position:fixed"));
    assert!(html.contains("color:blue;text-decoration"));
    assert!(html.contains(r#"<body style="margin:0;padding:0;background-color:#eee;">"#));
    assert!(!html.contains("background-image"));
}
