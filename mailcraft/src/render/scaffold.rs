use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::block::{Content, Document};
use crate::html::plain_text;
use crate::options::ExportOptions;
use crate::personalize::Placeholder;
use crate::render::{TABLE_ATTRS, css_value, render_rows};

/// Class of the hidden preheader row; the importer skips it.
pub(crate) const PREHEADER_CLASS: &str = "mc-preheader";
/// Class of the footer row; the importer skips it.
pub(crate) const FOOTER_CLASS: &str = "mc-footer";

const HEAD_STYLE: &str = "body{margin:0;padding:0;width:100%!important;-webkit-text-size-adjust:100%;-ms-text-size-adjust:100%;}\
table,td{border-collapse:collapse;mso-table-lspace:0pt;mso-table-rspace:0pt;}\
img{border:0;outline:none;text-decoration:none;-ms-interpolation-mode:bicubic;}\
p{margin:0;}a{color:inherit;}";

/// Render `doc` as a complete email document: compatibility head, hidden
/// preheader, body rows, footer and the open-tracking pixel.
pub fn render_email(doc: &Document, options: &ExportOptions) -> String {
    let mut out = String::new();

    out.push_str(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#);
    out.push('\n');
    out.push_str(r#"<html xmlns="http://www.w3.org/1999/xhtml">"#);
    out.push('\n');
    out.push_str("<head>\n");
    out.push_str(r#"<meta http-equiv="Content-Type" content="text/html; charset=UTF-8" />"#);
    out.push('\n');
    out.push_str(r#"<meta name="viewport" content="width=device-width, initial-scale=1.0" />"#);
    out.push('\n');
    out.push_str(r#"<meta http-equiv="X-UA-Compatible" content="IE=edge" />"#);
    out.push('\n');
    out.push_str(&format!("<title>{}</title>\n", encode_text(&options.title)));
    out.push_str(&format!(r#"<style type="text/css">{}</style>"#, HEAD_STYLE));
    out.push_str("\n</head>\n");

    let background = encode_double_quoted_attribute(css_value(&options.background));
    out.push_str(&format!(
        r#"<body style="margin:0;padding:0;background-color:{};">"#,
        background
    ));
    out.push('\n');
    out.push_str(&format!(
        r#"<table {} width="100%" bgcolor="{}"><tr><td align="center">"#,
        TABLE_ATTRS, background
    ));
    out.push('\n');
    out.push_str(&format!(
        r#"<table {} width="{}" class="email-container" style="max-width:{}px;background-color:#ffffff;">"#,
        TABLE_ATTRS, options.content_width, options.content_width
    ));
    out.push('\n');

    out.push_str(&format!(
        r#"<tr><td class="{}" style="display:none;font-size:1px;color:#ffffff;line-height:1px;max-height:0;max-width:0;opacity:0;overflow:hidden;mso-hide:all;">{}</td></tr>"#,
        PREHEADER_CLASS,
        encode_text(&preheader(doc, options.preheader_length))
    ));
    out.push('\n');

    out.push_str(&render_rows(doc));

    out.push_str(&format!(
        r#"<tr><td class="{}" align="center" style="padding:20px;font-size:12px;line-height:1.5;color:#999999;">{}"#,
        FOOTER_CLASS,
        encode_text(&options.footer)
    ));
    if let Some(base) = &options.unsubscribe_url {
        let href = with_query(
            base,
            &[
                ("email", Placeholder::Email),
                ("campaignId", Placeholder::CampaignId),
            ],
        );
        out.push_str(&format!(
            r#"<br /><a href="{}" style="color:#999999;text-decoration:underline;">Unsubscribe</a>"#,
            encode_double_quoted_attribute(&href)
        ));
    }
    out.push_str("</td></tr>\n</table>\n");

    out.push_str(&format!(
        r#"<img src="{}" width="1" height="1" alt="" style="display:block;width:1px;height:1px;border:0;" />"#,
        encode_double_quoted_attribute(&tracking_pixel_url(&options.tracking_url))
    ));
    out.push_str("\n</td></tr></table>\n</body>\n</html>\n");
    out
}

/// The tracking pixel URL with its placeholder query, before personalization.
pub fn tracking_pixel_url(base: &str) -> String {
    with_query(
        base,
        &[
            ("email", Placeholder::Email),
            ("campaignId", Placeholder::CampaignId),
            ("subject", Placeholder::Subject),
            ("sentAt", Placeholder::SentAt),
        ],
    )
}

fn with_query(base: &str, params: &[(&str, Placeholder)]) -> String {
    let mut url = base.to_string();
    let mut sep = if base.contains('?') { '&' } else { '?' };
    for (name, token) in params {
        url.push(sep);
        url.push_str(name);
        url.push('=');
        url.push_str(token.token());
        sep = '&';
    }
    url
}

/// Plain text of the first text block, truncated to `max_chars`.
pub fn preheader(doc: &Document, max_chars: usize) -> String {
    let Some(first) = doc.blocks().find_map(|block| match &block.content {
        Content::Text(text) => Some(text.content.as_str()),
        _ => None,
    }) else {
        return String::new();
    };
    let text = plain_text(first);
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].trim_end().to_string(),
        None => text,
    }
}
