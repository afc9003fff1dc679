//! Markup parsing and serialization.
//!
//! The parser is lenient in the way browsers are when assigning `innerHTML`:
//! it never fails, drops what it cannot place and closes whatever is left
//! open. It does not apply implied end tags, so a tree built by the editor
//! always survives a serialize/parse round trip unchanged.

use std::borrow::Cow;

use smol_str::SmolStr;

use crate::dom::{Attribute, Element, Node, is_void_element, normalize};

/// Serialize a node list to markup.
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

/// Serialize a single node to markup.
pub fn serialize_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// Write an element's start tag, e.g. `<p class="text-left">`.
pub(crate) fn write_start_tag(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    for attr in &el.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(&attr.value));
        out.push('"');
    }
    out.push('>');
}

pub(crate) fn write_end_tag(el: &Element, out: &mut String) {
    if !el.is_void() {
        out.push_str("</");
        out.push_str(&el.name);
        out.push('>');
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(el) => {
            write_start_tag(el, out);
            if !el.is_void() {
                for child in &el.children {
                    write_node(child, out);
                }
            }
            write_end_tag(el, out);
        }
        Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

/// Parse markup into a node list. Never fails.
pub fn parse(markup: &str) -> Vec<Node> {
    let mut builder = TreeBuilder::default();
    let mut rest = markup;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            builder.text(rest);
            break;
        };
        if lt > 0 {
            builder.text(&rest[..lt]);
            rest = &rest[lt..];
        }

        let after = &rest[1..];
        if let Some(body) = after.strip_prefix("!--") {
            match body.find("-->") {
                Some(end) => {
                    builder.comment(&body[..end]);
                    rest = &body[end + 3..];
                }
                None => {
                    builder.comment(body);
                    rest = "";
                }
            }
        } else if after.starts_with('!') || after.starts_with('?') {
            // Doctype or processing instruction: dropped.
            rest = skip_past_gt(after);
        } else if let Some(body) = after.strip_prefix('/') {
            if body.starts_with(|c: char| c.is_ascii_alphabetic()) {
                let name_len = body
                    .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
                    .unwrap_or(body.len());
                let name = body[..name_len].to_ascii_lowercase();
                rest = skip_past_gt(&body[name_len..]);
                builder.end_tag(&name);
            } else {
                // `</` not followed by a name is a bogus comment.
                rest = skip_past_gt(body);
            }
        } else if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
            match parse_start_tag(after) {
                Some((el, remaining)) => {
                    builder.start_tag(el);
                    rest = remaining;
                }
                // Unterminated tag at end of input.
                None => rest = "",
            }
        } else {
            builder.text("<");
            rest = after;
        }
    }

    builder.finish()
}

fn skip_past_gt(s: &str) -> &str {
    match s.find('>') {
        Some(pos) => &s[pos + 1..],
        None => "",
    }
}

/// Parse a start tag body (everything after `<`). Returns the element and the
/// input following the closing `>`.
fn parse_start_tag(input: &str) -> Option<(Element, &str)> {
    let name_len = input
        .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
        .unwrap_or(input.len());
    let mut el = Element::new(SmolStr::new(input[..name_len].to_ascii_lowercase()));
    let mut rest = &input[name_len..];

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '/');
        if let Some(after) = rest.strip_prefix('>') {
            return Some((el, after));
        }
        if rest.is_empty() {
            return None;
        }

        let attr_len = rest
            .find(|c: char| c.is_ascii_whitespace() || matches!(c, '=' | '>' | '/'))
            .unwrap_or(rest.len());
        // A leading `=` belongs to the name, as in the HTML tokenizer.
        let attr_len = if attr_len == 0 { 1 } else { attr_len };
        let name = rest[..attr_len].to_ascii_lowercase();
        rest = rest[attr_len..].trim_start_matches(|c: char| c.is_ascii_whitespace());

        let mut value = String::new();
        if let Some(after_eq) = rest.strip_prefix('=') {
            rest = after_eq.trim_start_matches(|c: char| c.is_ascii_whitespace());
            let (raw, remaining) = match rest.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &rest[1..];
                    match body.find(quote) {
                        Some(end) => (&body[..end], &body[end + 1..]),
                        None => return None,
                    }
                }
                _ => {
                    let end = rest
                        .find(|c: char| c.is_ascii_whitespace() || c == '>')
                        .unwrap_or(rest.len());
                    (&rest[..end], &rest[end..])
                }
            };
            value = decode(raw).into_owned();
            rest = remaining;
        }

        if el.attribute(&name).is_none() {
            el.attributes.push(Attribute::new(name, value));
        }
    }
}

fn decode(raw: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(raw)
}

/// Stack-based tree construction.
#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn current(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(el) => &mut el.children,
            None => &mut self.root,
        }
    }

    fn text(&mut self, raw: &str) {
        let text = decode(raw).into_owned();
        self.current().push(Node::Text(text));
    }

    fn comment(&mut self, text: &str) {
        self.current().push(Node::Comment(text.to_string()));
    }

    fn start_tag(&mut self, el: Element) {
        if is_void_element(&el.name) {
            self.current().push(Node::Element(el));
        } else {
            self.open.push(el);
        }
    }

    fn end_tag(&mut self, name: &str) {
        let Some(pos) = self.open.iter().rposition(|el| el.name == name) else {
            tracing::trace!(target: "toolbox::html", tag = name, "dropping stray end tag");
            return;
        };
        while self.open.len() > pos {
            self.close_current();
        }
    }

    fn close_current(&mut self) {
        if let Some(el) = self.open.pop() {
            self.current().push(Node::Element(el));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_current();
        }
        normalize(&mut self.root);
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_nested() {
        let nodes = parse("a<b>bold <i>it</i></b>c");
        assert_eq!(
            nodes,
            vec![
                Node::text("a"),
                Element::new("b")
                    .with_child("bold ")
                    .with_child(Element::new("i").with_child("it"))
                    .into(),
                Node::text("c"),
            ]
        );
    }

    #[test]
    fn test_parse_attributes() {
        let nodes = parse(r#"<div class="alert alert-success" role='alert' hidden data-x=1>x</div>"#);
        let el = nodes[0].as_element().unwrap();
        assert_eq!(el.attribute("class"), Some("alert alert-success"));
        assert_eq!(el.attribute("role"), Some("alert"));
        assert_eq!(el.attribute("hidden"), Some(""));
        assert_eq!(el.attribute("data-x"), Some("1"));
    }

    #[test]
    fn test_void_end_tag_is_dropped() {
        let nodes = parse(r#"<img src="a.png" class="img-responsive">pic</img>"#);
        assert_eq!(
            nodes,
            vec![
                Element::new("img")
                    .with_attribute("src", "a.png")
                    .with_attribute("class", "img-responsive")
                    .into(),
                Node::text("pic"),
            ]
        );
        assert_eq!(
            serialize(&nodes),
            r#"<img src="a.png" class="img-responsive">pic"#
        );
    }

    #[test]
    fn test_lenient_recovery() {
        // Unclosed elements close at end, stray end tags vanish, mismatched
        // closers pop everything opened inside them.
        assert_eq!(serialize(&parse("<b>open")), "<b>open</b>");
        assert_eq!(serialize(&parse("x</i>y")), "xy");
        assert_eq!(serialize(&parse("<p><b>a</p>b")), "<p><b>a</b></p>b");
        assert_eq!(serialize(&parse("1 < 2")), "1 &lt; 2");
        assert_eq!(serialize(&parse("<b")), "");
        assert_eq!(serialize(&parse("<!DOCTYPE html><p>x</p>")), "<p>x</p>");
    }

    #[test]
    fn test_entities_and_escaping() {
        let nodes = parse("fish &amp; chips &lt;3");
        assert_eq!(nodes, vec![Node::text("fish & chips <3")]);
        assert_eq!(serialize(&nodes), "fish &amp; chips &lt;3");
    }

    #[test]
    fn test_comments_round_trip() {
        let markup = "a<!-- note -->b";
        assert_eq!(serialize(&parse(markup)), markup);
    }

    #[test]
    fn test_no_implied_end_tags() {
        let markup = r#"<p>a<p class="text-center">b</p>c</p>"#;
        assert_eq!(serialize(&parse(markup)), markup);
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(serialize(&parse("<B CLASS=x>y</b>")), r#"<b class="x">y</b>"#);
    }
}
