use mailcraft::html::{Node, Style, normalize, outer_span, parse_document, parse_fragment, plain_text};
use pretty_assertions::assert_eq;

#[test]
fn elements_attributes_and_spans() {
    let source = r#"<TABLE Width="600" class='a b'><tr><td>x</td></tr></TABLE>"#;
    let fragment = parse_fragment(source);
    let table = fragment.nodes[0].as_element().unwrap();

    assert_eq!(table.name, "table");
    assert_eq!(table.attr("width"), Some("600"));
    assert!(table.has_class("b"));
    assert_eq!(table.span, Some(0..source.find('>').unwrap() + 1));
    assert_eq!(table.inner_html(), "<tbody><tr><td>x</td></tr></tbody>");

    let tbody = table.elements().next().unwrap();
    assert_eq!(tbody.name, "tbody");
    assert_eq!(tbody.span, None);

    let td = table.find(&|el| el.is("td")).unwrap();
    assert_eq!(td.text_content(), "x");
    assert_eq!(td.inner_html(), "x");
    assert_eq!(td.span, Some(source.find("<td>").unwrap()..source.find("x").unwrap()));
}

#[test]
fn spans_after_multibyte_text() {
    let source = "<p>Grüße, naïve café ☕</p>\n<div class=\"é\">日本語 <b>太字</b></div>";
    let fragment = parse_fragment(source);
    let elements: Vec<_> = fragment.nodes.iter().filter_map(Node::as_element).collect();
    assert_eq!(elements.len(), 2);

    let div = elements[1];
    let start = source.find("<div").unwrap();
    assert_eq!(div.span, Some(start..source.find("日").unwrap()));
    assert_eq!(div.attr("class"), Some("é"));
    assert_eq!(div.text_content(), "日本語 太字");
    assert_eq!(outer_span(source, div), Some(start..source.len()));

    let b = div.find(&|el| el.is("b")).unwrap();
    assert_eq!(&source[b.span.clone().unwrap()], "<b>");
}

#[test]
fn outer_span_matches_nested_end_tags() {
    let source = "<table><tr><td><table><tr><td>é</td></tr></table></td></tr><tr><td>b</td></tr></table>";
    let fragment = parse_fragment(source);
    let table = fragment.nodes[0].as_element().unwrap();
    let tbody = table.elements().next().unwrap();
    let rows: Vec<_> = tbody.elements().collect();
    assert_eq!(rows.len(), 2);

    let first_end = source.find("</tr><tr>").unwrap() + "</tr>".len();
    assert_eq!(outer_span(source, rows[0]), Some("<table>".len()..first_end));
    assert_eq!(
        &source[outer_span(source, rows[1]).unwrap()],
        "<tr><td>b</td></tr>"
    );
}

#[test]
fn outer_span_without_end_tag_is_the_start_tag() {
    let source = "<ul><li>one<li>two</ul>";
    let fragment = parse_fragment(source);
    let ul = fragment.nodes[0].as_element().unwrap();
    let first = ul.elements().next().unwrap();
    assert_eq!(outer_span(source, first), Some(4..8));
}

#[test]
fn void_and_self_closing_elements() {
    let fragment = parse_fragment(r#"<p>a<br>b<img src="x.png"/>c</p>"#);
    let p = fragment.nodes[0].as_element().unwrap();
    let names: Vec<&str> = p.elements().map(|el| el.name.as_str()).collect();
    assert_eq!(names, vec!["br", "img"]);
    assert_eq!(p.text_content(), "abc");
}

#[test]
fn implied_end_tags() {
    let fragment = parse_fragment("<ul><li>one<li>two</ul><table><tr><td>a<td>b<tr><td>c</table>");
    let ul = fragment.nodes[0].as_element().unwrap();
    assert_eq!(ul.elements().count(), 2);

    let table = fragment.nodes[1].as_element().unwrap();
    let tbody = table.sole_element().unwrap();
    let rows: Vec<_> = tbody.elements().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].elements().count(), 2);
    assert_eq!(rows[1].elements().count(), 1);
}

#[test]
fn stray_end_tags_and_unclosed_elements() {
    let source = "</span><div><p>open";
    let fragment = parse_fragment(source);
    assert_eq!(fragment.nodes.len(), 1);
    let div = fragment.nodes[0].as_element().unwrap();
    assert_eq!(div.span, Some(7..12));
    assert_eq!(div.text_content(), "open");
}

#[test]
fn comments_and_raw_text() {
    let source = "<!-- note --><style>td > p { color: red; }</style><p>after</p>";
    let fragment = parse_fragment(source);
    assert_eq!(fragment.nodes.len(), 3);
    assert_eq!(fragment.nodes[0], Node::Comment(" note ".to_string()));
    let style = fragment.nodes[1].as_element().unwrap();
    assert_eq!(style.text_content(), "td > p { color: red; }");
    let p = fragment.nodes[2].as_element().unwrap();
    assert_eq!(p.span, Some(source.find("<p>").unwrap()..source.find("after").unwrap()));
}

#[test]
fn lone_angle_bracket_is_text() {
    let fragment = parse_fragment("1 < 2 &amp; 3");
    let text: String = fragment
        .nodes
        .iter()
        .map(|node| match node {
            Node::Text(text) => text.as_str(),
            _ => panic!("expected only text, got {:?}", node),
        })
        .collect();
    assert_eq!(text, "1 < 2 & 3");
}

#[test]
fn documents_keep_head_and_body() {
    let source = "<!DOCTYPE html><html><head><title>Größe</title></head><body><p>x</p></body></html>";
    let fragment = parse_document(source);
    let html = fragment.nodes[0].as_element().unwrap();
    assert_eq!(html.span, Some(15..21));
    let title = html.find(&|el| el.is("title")).unwrap();
    assert_eq!(title.text_content(), "Größe");
    let p = html.find(&|el| el.is("p")).unwrap();
    assert_eq!(p.span, Some(source.find("<p>").unwrap()..source.find("x</p>").unwrap()));
}

#[test]
fn normalized_markup() {
    assert_eq!(normalize(r#"a<br />b &quot;c&quot; &amp; d"#), r#"a<br>b "c" &amp; d"#);
    assert_eq!(normalize("<em>é</em>"), normalize("<EM>&eacute;</EM>"));
}

#[test]
fn style_declarations() {
    let style = Style::parse("Padding: 12px 24px; font-size:16.4px;color:#333; color: red ;");
    assert_eq!(style.px("padding"), Some(12));
    assert_eq!(style.px("font-size"), Some(16));
    assert_eq!(style.get("color"), Some("red"));
    assert!(!style.has("margin"));
    assert!(Style::parse("").is_empty());
}

#[test]
fn plain_text_collapses_whitespace() {
    assert_eq!(plain_text("  <p>Hello,\n   <b>world</b></p> "), "Hello, world");
    assert_eq!(plain_text("Caf&eacute; <i>crème</i>&nbsp;brûlée"), "Café crème brûlée");
}
