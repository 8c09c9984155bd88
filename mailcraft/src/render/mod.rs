pub(crate) mod scaffold;

pub use scaffold::{preheader, render_email, tracking_pixel_url};

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::block::{
    Align, Block, BlockId, ButtonBlock, Columns, Content, Document, ImageBlock, Layout, LinkBlock,
    ListBlock, TextBlock,
};

/// Attributes shared by every layout table we emit.
pub(crate) const TABLE_ATTRS: &str =
    r#"role="presentation" border="0" cellpadding="0" cellspacing="0""#;

/// A colour or other value placed inside a `style` attribute. Everything from
/// the first `;`, `{` or `}` on is dropped so a value is one declaration.
pub(crate) fn css_value(value: &str) -> &str {
    let end = value.find([';', '{', '}']).unwrap_or(value.len());
    value[..end].trim()
}

/// Render the top-level blocks of `doc` as table rows, one `<tr>` per block.
///
/// Pure and total: unknown blocks become an HTML comment, never markup.
pub fn render_rows(doc: &Document) -> String {
    let mut out = String::new();
    write_rows(doc, doc.roots(), &mut out);
    out
}

fn write_rows(doc: &Document, ids: &[BlockId], out: &mut String) {
    for id in ids {
        // Ids taken from `doc` always resolve.
        if let Some(block) = doc.get(*id) {
            write_row(doc, block, out);
        }
    }
}

fn write_row(doc: &Document, block: &Block, out: &mut String) {
    let layout = &block.layout;
    match &block.content {
        Content::Text(text) => {
            open_cell(layout, false, out);
            write_text(layout, text, out);
        }
        Content::Image(image) => {
            open_cell(layout, true, out);
            write_image(layout, image, out);
        }
        Content::Button(button) => {
            open_cell(layout, false, out);
            write_button(layout, button, out);
        }
        Content::List(list) => {
            open_cell(layout, false, out);
            write_list(layout, list, out);
        }
        Content::Link(link) => {
            open_cell(layout, false, out);
            write_link(layout, link, out);
        }
        Content::Columns(columns) => {
            open_cell(layout, true, out);
            write_columns(doc, columns, out);
        }
        Content::Unknown => {
            out.push_str(&format!(
                "<tr><td><!-- unsupported block {} -->",
                block.id
            ));
        }
    }
    out.push_str("</td></tr>\n");
}

/// `<tr><td>` for one block. Kinds without their own text element carry the
/// font size on the cell, where it governs alt text and inherited text.
fn open_cell(layout: &Layout, font_on_cell: bool, out: &mut String) {
    out.push_str(&format!(
        r#"<tr><td align="{}" style="padding:{}px;"#,
        layout.align.as_str(),
        layout.padding
    ));
    if font_on_cell {
        out.push_str(&format!("font-size:{}px;", layout.font_size));
    }
    out.push_str(r#"">"#);
}

fn write_text(layout: &Layout, text: &TextBlock, out: &mut String) {
    out.push_str(&format!(
        r#"<p style="margin:0;font-size:{}px;line-height:1.5;color:{};font-weight:{};">{}</p>"#,
        layout.font_size,
        encode_double_quoted_attribute(css_value(&text.color)),
        if text.bold { "bold" } else { "normal" },
        text.content
    ));
}

fn write_image(layout: &Layout, image: &ImageBlock, out: &mut String) {
    let mut style = String::from("display:block;border:0;");
    let mut size_attrs = String::new();
    match image.width {
        Some(w) => {
            style.push_str(&format!("width:{}px;", w));
            size_attrs.push_str(&format!(r#" width="{}""#, w));
        }
        None => style.push_str("max-width:100%;"),
    }
    match image.height {
        Some(h) => {
            style.push_str(&format!("height:{}px;", h));
            size_attrs.push_str(&format!(r#" height="{}""#, h));
        }
        None => style.push_str("height:auto;"),
    }
    style.push_str(&format!("border-radius:{}px;", image.border_radius));
    style.push_str(match layout.align {
        Align::Left => "margin:0;",
        Align::Center => "margin:0 auto;",
        Align::Right => "margin-left:auto;",
    });

    out.push_str(&format!(
        r#"<img src="{}" alt="{}"{} style="{}" />"#,
        encode_double_quoted_attribute(&image.src),
        encode_double_quoted_attribute(&image.alt),
        size_attrs,
        style
    ));
}

/// Buttons are a one-cell table around an anchor; Outlook ignores padding
/// and background on a bare `<a>`.
fn write_button(layout: &Layout, button: &ButtonBlock, out: &mut String) {
    let background = encode_double_quoted_attribute(css_value(&button.background));
    out.push_str(&format!(
        r#"<table {} align="{}"><tr><td align="center" bgcolor="{}" style="border-radius:4px;background-color:{};">"#,
        TABLE_ATTRS,
        layout.align.as_str(),
        background,
        background
    ));
    out.push_str(&format!(
        r#"<a href="{}" target="_blank" style="display:inline-block;padding:12px 24px;font-size:{}px;color:{};background-color:{};text-decoration:none;border-radius:4px;">{}</a>"#,
        encode_double_quoted_attribute(&button.href),
        layout.font_size,
        encode_double_quoted_attribute(css_value(&button.color)),
        background,
        encode_text(&button.label)
    ));
    out.push_str("</td></tr></table>");
}

fn write_list(layout: &Layout, list: &ListBlock, out: &mut String) {
    let tag = if list.ordered { "ol" } else { "ul" };
    out.push_str(&format!(
        r#"<{} style="margin:0;padding-left:20px;font-size:{}px;line-height:1.5;">"#,
        tag, layout.font_size
    ));
    for item in &list.items {
        out.push_str("<li>");
        out.push_str(item);
        out.push_str("</li>");
    }
    out.push_str(&format!("</{}>", tag));
}

fn write_link(layout: &Layout, link: &LinkBlock, out: &mut String) {
    out.push_str(&format!(
        r#"<a href="{}" target="_blank" style="font-size:{}px;color:{};text-decoration:{};">{}</a>"#,
        encode_double_quoted_attribute(&link.href),
        layout.font_size,
        encode_double_quoted_attribute(css_value(&link.color)),
        if link.underline { "underline" } else { "none" },
        encode_text(&link.text)
    ));
}

fn write_columns(doc: &Document, columns: &Columns, out: &mut String) {
    out.push_str(&format!(r#"<table {} width="100%"><tr>"#, TABLE_ATTRS));
    for side in [&columns.left, &columns.right] {
        out.push_str(&format!(
            "<td width=\"50%\" valign=\"top\"><table {} width=\"100%\">\n",
            TABLE_ATTRS
        ));
        write_rows(doc, side, out);
        out.push_str("</table></td>");
    }
    out.push_str("</tr></table>");
}
