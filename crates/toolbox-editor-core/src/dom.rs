//! Document tree for the rendered view.
//!
//! A deliberately small DOM: elements with ordered raw attributes, text and
//! comments. The rendered view owns a list of root nodes, which stand for the
//! children of the editable container.

use smol_str::SmolStr;

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Check if a tag name is a void element.
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// Check if a string is usable as an element name.
///
/// Mirrors what `createElement` accepts closely enough for toolbar tags:
/// an ASCII letter followed by letters, digits, `-`, `_`, `.` or `:`.
pub fn is_valid_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

/// A single attribute, kept in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: SmolStr,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub name: SmolStr,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element with no attributes.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attribute(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Builder: append a child.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    pub fn is_void(&self) -> bool {
        is_void_element(&self.name)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        text_content(&self.children)
    }

    /// A copy of this element without its children.
    pub fn shallow_clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
        }
    }
}

/// A node in the rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Length of this node's text content in chars.
    pub fn text_len(&self) -> usize {
        match self {
            Self::Element(el) => el.children.iter().map(Node::text_len).sum(),
            Self::Text(text) => text.chars().count(),
            Self::Comment(_) => 0,
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Concatenated text of a node list.
pub fn text_content(nodes: &[Node]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(el) => collect_text(&el.children, out),
            Node::Text(text) => out.push_str(text),
            Node::Comment(_) => {}
        }
    }
}

/// Merge adjacent text nodes and drop empty ones, recursively.
pub fn normalize(nodes: &mut Vec<Node>) {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        match node {
            Node::Text(text) if text.is_empty() => {}
            Node::Text(text) => match merged.last_mut() {
                Some(Node::Text(prev)) => prev.push_str(&text),
                _ => merged.push(Node::Text(text)),
            },
            Node::Element(mut el) => {
                normalize(&mut el.children);
                merged.push(Node::Element(el));
            }
            other => merged.push(other),
        }
    }
    *nodes = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_elements() {
        assert!(is_void_element("br"));
        assert!(is_void_element("IMG"));
        assert!(!is_void_element("p"));
    }

    #[test]
    fn test_element_names() {
        assert!(is_valid_element_name("h1"));
        assert!(is_valid_element_name("my-tag"));
        assert!(!is_valid_element_name(""));
        assert!(!is_valid_element_name("1h"));
        assert!(!is_valid_element_name("p class=\"x\""));
    }

    #[test]
    fn test_text_content_and_len() {
        let nodes = vec![
            Node::text("a"),
            Element::new("b")
                .with_child("bc")
                .with_child(Element::new("br"))
                .into(),
            Node::Comment("ignored".into()),
        ];
        assert_eq!(text_content(&nodes), "abc");
        assert_eq!(nodes.iter().map(Node::text_len).sum::<usize>(), 3);
    }

    #[test]
    fn test_normalize_merges_text() {
        let mut nodes = vec![
            Node::text("a"),
            Node::text(""),
            Node::text("b"),
            Element::new("i")
                .with_child("c")
                .with_child("d")
                .into(),
        ];
        normalize(&mut nodes);
        assert_eq!(
            nodes,
            vec![
                Node::text("ab"),
                Element::new("i").with_child("cd").into()
            ]
        );
    }

    #[test]
    fn test_attribute_lookup() {
        let el = Element::new("p").with_attribute("class", "text-left");
        assert_eq!(el.attribute("CLASS"), Some("text-left"));
        assert_eq!(el.attribute("id"), None);
    }
}
