//! Text-offset ranges over the rendered tree.
//!
//! Range operations work on a flattened token stream of the tree: one token
//! per character, start tag, end tag or zero-length node. A boundary is an
//! index between two tokens. Deleting a token slice keeps the start/end tags
//! of partially selected elements, which is exactly `Range.deleteContents`,
//! and the stream always rebuilds into a well-formed tree.

use std::ops::Range;

use crate::dom::{Element, Node, normalize};
use crate::html::{write_end_tag, write_start_tag};
use crate::types::Selection;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Start tag of a non-void element.
    Open(Element),
    /// End tag matching the nearest unmatched `Open`.
    Close,
    Char(char),
    /// Void element or comment: occupies no text offset.
    Atom(Node),
}

impl Token {
    fn is_char(&self) -> bool {
        matches!(self, Token::Char(_))
    }
}

/// How far a resolved range reaches past the selected chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extent {
    /// Only the selected chars and what lies between them.
    Text,
    /// Also the elements whose text is entirely selected.
    Covering,
}

/// Flattened view of a node list.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlatTree {
    tokens: Vec<Token>,
}

impl FlatTree {
    pub(crate) fn from_nodes(nodes: &[Node]) -> Self {
        let mut tokens = Vec::new();
        flatten(nodes, &mut tokens);
        Self { tokens }
    }

    /// Rebuild a normalized node list.
    pub(crate) fn into_nodes(self) -> Vec<Node> {
        let mut root: Vec<Node> = Vec::new();
        let mut open: Vec<Element> = Vec::new();

        for token in self.tokens {
            match token {
                Token::Open(el) => open.push(el),
                Token::Close => {
                    if let Some(el) = open.pop() {
                        push_node(&mut root, &mut open, Node::Element(el));
                    }
                }
                Token::Char(c) => match current(&mut root, &mut open).last_mut() {
                    Some(Node::Text(text)) => text.push(c),
                    _ => push_node(&mut root, &mut open, Node::Text(c.to_string())),
                },
                Token::Atom(node) => push_node(&mut root, &mut open, node),
            }
        }
        while let Some(el) = open.pop() {
            push_node(&mut root, &mut open, Node::Element(el));
        }

        normalize(&mut root);
        root
    }

    /// Total text length in chars.
    pub(crate) fn text_len(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_char()).count()
    }

    /// Resolve a selection to a token range.
    ///
    /// `Extent::Text` keeps both boundaries next to the selected chars, so
    /// elements around the selected text survive an edit. `Extent::Covering`
    /// pushes them outward, so an element whose text is fully selected is
    /// itself inside the range. Collapsed selections resolve to a caret
    /// either way.
    pub(crate) fn resolve(&self, selection: Selection, extent: Extent) -> Range<usize> {
        let sel = selection.normalize().clamp(self.text_len());
        if sel.is_collapsed() {
            let caret = self.resolve_caret(sel.start());
            return caret..caret;
        }
        let (start, end) = match extent {
            Extent::Text => (
                self.boundary_before_char(sel.start()),
                self.boundary_after_chars(sel.end()),
            ),
            Extent::Covering => (
                self.covering_start(sel.start()),
                self.covering_end(sel.end()),
            ),
        };
        start..end.max(start)
    }

    /// Caret position for a text offset.
    ///
    /// Sits after the last zero-length node between the neighbouring chars
    /// if there is one, else right after the preceding char (or before the
    /// first char at offset 0).
    fn resolve_caret(&self, offset: usize) -> usize {
        let gap_start = self.boundary_after_chars(offset);
        let gap_end = self.boundary_before_char(offset).max(gap_start);
        let last_atom = self.tokens[gap_start..gap_end]
            .iter()
            .rposition(|t| matches!(t, Token::Atom(_)));
        match last_atom {
            Some(idx) => gap_start + idx + 1,
            None if offset == 0 => gap_end,
            None => gap_start,
        }
    }

    /// Earliest boundary with `offset` chars before it, stepped forward over
    /// end tags and zero-length nodes.
    fn covering_start(&self, offset: usize) -> usize {
        let mut idx = self.boundary_after_chars(offset);
        while let Some(Token::Close | Token::Atom(_)) = self.tokens.get(idx) {
            idx += 1;
        }
        idx
    }

    /// Latest boundary with `offset` chars before it, stepped back over
    /// start tags and zero-length nodes.
    fn covering_end(&self, offset: usize) -> usize {
        let mut idx = self.boundary_before_char(offset);
        while idx > 0 && matches!(self.tokens[idx - 1], Token::Open(_) | Token::Atom(_)) {
            idx -= 1;
        }
        idx
    }

    /// Number of chars before a token boundary.
    pub(crate) fn offset_at(&self, idx: usize) -> usize {
        self.tokens[..idx.min(self.tokens.len())]
            .iter()
            .filter(|t| t.is_char())
            .count()
    }

    /// Plain text inside a token range.
    pub(crate) fn text_in(&self, range: Range<usize>) -> String {
        self.tokens[range]
            .iter()
            .filter_map(|t| match t {
                Token::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Markup of a token range, cloning partially selected ancestors the way
    /// `Range.cloneContents` does.
    pub(crate) fn markup_in(&self, range: Range<usize>) -> String {
        if range.is_empty() {
            return String::new();
        }
        let mut ancestors = self.open_elements_at(range.start);
        let mut prefix: Vec<Element> = Vec::new();
        let mut body = String::new();
        let mut local: Vec<&Element> = Vec::new();

        for token in &self.tokens[range] {
            match token {
                Token::Open(el) => {
                    write_start_tag(el, &mut body);
                    local.push(el);
                }
                Token::Close => match local.pop() {
                    Some(el) => write_end_tag(el, &mut body),
                    None => {
                        // Closes an element opened before the range.
                        if let Some(el) = ancestors.pop() {
                            write_end_tag(&el, &mut body);
                            prefix.push(el);
                        }
                    }
                },
                Token::Char(c) => body.push_str(&html_escape::encode_text(&c.to_string())),
                Token::Atom(node) => body.push_str(&crate::html::serialize_node(node)),
            }
        }
        while let Some(el) = local.pop() {
            write_end_tag(el, &mut body);
        }

        let mut out = String::new();
        for el in prefix.iter().rev() {
            write_start_tag(el, &mut out);
        }
        out.push_str(&body);
        out
    }

    /// Delete a token range with `deleteContents` semantics.
    ///
    /// Returns the collapse point: after the end tags of partially selected
    /// start-side elements, before the start tags of partially selected
    /// end-side elements.
    pub(crate) fn delete(&mut self, range: Range<usize>) -> usize {
        let start = range.start;
        let mut depth = 0usize;
        let mut closes: Vec<Token> = Vec::new();
        let mut opens: Vec<Option<Token>> = Vec::new();

        for token in self.tokens.drain(range) {
            match token {
                Token::Open(el) => {
                    opens.push(Some(Token::Open(el)));
                    depth += 1;
                }
                Token::Close if depth == 0 => closes.push(Token::Close),
                Token::Close => {
                    // Matched inside the range: the whole element goes.
                    depth -= 1;
                    if let Some(idx) = opens.iter().rposition(Option::is_some) {
                        opens[idx] = None;
                    }
                }
                Token::Char(_) | Token::Atom(_) => {}
            }
        }

        let collapse = start + closes.len();
        let kept: Vec<Token> = closes
            .into_iter()
            .chain(opens.into_iter().flatten())
            .collect();
        self.tokens.splice(start..start, kept);
        collapse
    }

    /// Insert nodes at a token boundary. Returns the boundary after them.
    pub(crate) fn insert(&mut self, at: usize, nodes: &[Node]) -> usize {
        let mut tokens = Vec::new();
        flatten(nodes, &mut tokens);
        let count = tokens.len();
        self.tokens.splice(at..at, tokens);
        at + count
    }

    fn boundary_after_chars(&self, offset: usize) -> usize {
        if offset == 0 {
            return 0;
        }
        let mut seen = 0;
        for (idx, token) in self.tokens.iter().enumerate() {
            if token.is_char() {
                seen += 1;
                if seen == offset {
                    return idx + 1;
                }
            }
        }
        self.tokens.len()
    }

    fn boundary_before_char(&self, offset: usize) -> usize {
        let mut seen = 0;
        for (idx, token) in self.tokens.iter().enumerate() {
            if token.is_char() {
                if seen == offset {
                    return idx;
                }
                seen += 1;
            }
        }
        self.tokens.len()
    }

    /// Elements open at a boundary, outermost first.
    fn open_elements_at(&self, idx: usize) -> Vec<Element> {
        let mut open: Vec<Element> = Vec::new();
        for token in &self.tokens[..idx] {
            match token {
                Token::Open(el) => open.push(el.shallow_clone()),
                Token::Close => {
                    open.pop();
                }
                _ => {}
            }
        }
        open
    }
}

fn flatten(nodes: &[Node], out: &mut Vec<Token>) {
    for node in nodes {
        match node {
            Node::Element(el) if el.is_void() => out.push(Token::Atom(Node::Element(el.clone()))),
            Node::Element(el) => {
                out.push(Token::Open(el.shallow_clone()));
                flatten(&el.children, out);
                out.push(Token::Close);
            }
            Node::Text(text) => out.extend(text.chars().map(Token::Char)),
            Node::Comment(_) => out.push(Token::Atom(node.clone())),
        }
    }
}

fn current<'a>(root: &'a mut Vec<Node>, open: &'a mut [Element]) -> &'a mut Vec<Node> {
    match open.last_mut() {
        Some(el) => &mut el.children,
        None => root,
    }
}

fn push_node(root: &mut Vec<Node>, open: &mut [Element], node: Node) {
    current(root, open).push(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{parse, serialize};

    fn flat(markup: &str) -> FlatTree {
        FlatTree::from_nodes(&parse(markup))
    }

    fn delete_text(markup: &str, sel: Selection, extent: Extent) -> (String, usize) {
        let mut tree = flat(markup);
        let range = tree.resolve(sel, extent);
        let collapse = tree.delete(range);
        let offset = tree.offset_at(collapse);
        (serialize(&tree.into_nodes()), offset)
    }

    fn replace_text(markup: &str, sel: Selection, with: &str) -> String {
        let mut tree = flat(markup);
        let range = tree.resolve(sel, Extent::Text);
        let collapse = tree.delete(range);
        tree.insert(collapse, &[Node::text(with)]);
        serialize(&tree.into_nodes())
    }

    #[test]
    fn test_round_trip_through_tokens() {
        let markup = r#"a<b>b<i>c</i></b><br><!--x--><p class="y">d</p>"#;
        assert_eq!(serialize(&flat(markup).into_nodes()), markup);
    }

    #[test]
    fn test_covering_extent_selects_whole_element() {
        let tree = flat("ab<b>cd</b>ef");
        let range = tree.resolve(Selection::new(2, 4), Extent::Covering);
        assert_eq!(tree.markup_in(range.clone()), "<b>cd</b>");
        assert_eq!(tree.text_in(range), "cd");
    }

    #[test]
    fn test_text_extent_stays_inside_element() {
        let tree = flat("ab<b>cd</b>ef");
        let range = tree.resolve(Selection::new(2, 4), Extent::Text);
        assert_eq!(tree.text_in(range.clone()), "cd");
        assert_eq!(tree.markup_in(range), "cd");

        assert_eq!(
            replace_text(r#"<p class="text-center">note</p>"#, Selection::new(0, 4), "X"),
            r#"<p class="text-center">X</p>"#
        );
        assert_eq!(
            replace_text("<h1>Title</h1><p>body</p>", Selection::new(0, 5), "X"),
            "<h1>X</h1><p>body</p>"
        );
    }

    #[test]
    fn test_zero_length_nodes_at_boundaries_stay_outside() {
        let tree = flat("a<br>b");
        for extent in [Extent::Text, Extent::Covering] {
            let markup = |sel| tree.markup_in(tree.resolve(sel, extent));
            assert_eq!(markup(Selection::new(0, 1)), "a");
            assert_eq!(markup(Selection::new(1, 2)), "b");
            assert_eq!(markup(Selection::new(0, 2)), "a<br>b");
        }
    }

    #[test]
    fn test_partial_clone_wraps_ancestors() {
        let tree = flat("<p>ab<b>cd</b></p>ef");
        let range = tree.resolve(Selection::new(3, 5), Extent::Text);
        assert_eq!(tree.markup_in(range), "<p><b>d</b></p>e");
    }

    #[test]
    fn test_delete_inside_text() {
        assert_eq!(
            delete_text("hello world", Selection::new(5, 11), Extent::Text),
            ("hello".to_string(), 5)
        );
    }

    #[test]
    fn test_delete_keeps_partial_elements() {
        assert_eq!(
            delete_text("<p>ab</p><p>cd</p>", Selection::new(1, 3), Extent::Text),
            ("<p>a</p><p>d</p>".to_string(), 1)
        );
    }

    #[test]
    fn test_delete_collapse_point_leaves_start_element() {
        let mut tree = flat("ab<b>cd</b>ef");
        let range = tree.resolve(Selection::new(3, 5), Extent::Text);
        let collapse = tree.delete(range);
        let after = tree.insert(collapse, &[Node::text("X")]);
        assert_eq!(tree.offset_at(after), 4);
        assert_eq!(serialize(&tree.into_nodes()), "ab<b>c</b>Xf");
    }

    #[test]
    fn test_delete_whole_element_text() {
        assert_eq!(
            delete_text("x<b>word</b>y", Selection::new(1, 5), Extent::Covering),
            ("xy".to_string(), 1)
        );
        assert_eq!(
            delete_text("x<b>word</b>y", Selection::new(1, 5), Extent::Text),
            ("x<b></b>y".to_string(), 1)
        );
    }

    #[test]
    fn test_backwards_and_out_of_range_selection() {
        let tree = flat("abc");
        let text = |sel| tree.text_in(tree.resolve(sel, Extent::Text));
        assert_eq!(text(Selection::new(3, 1)), "bc");
        assert_eq!(text(Selection::new(1, 99)), "bc");
    }

    #[test]
    fn test_caret_steps_past_zero_length_nodes() {
        let mut tree = flat("a<br>b");
        let caret = tree.resolve(Selection::caret(1), Extent::Text);
        tree.insert(caret.start, &[Node::text("X")]);
        assert_eq!(serialize(&tree.into_nodes()), "a<br>Xb");
    }

    #[test]
    fn test_caret_stays_in_enclosing_element() {
        let mut tree = flat("<p>ab</p>");
        let caret = tree.resolve(Selection::caret(2), Extent::Text);
        tree.insert(caret.start, &[Node::text("X")]);
        assert_eq!(serialize(&tree.into_nodes()), "<p>abX</p>");

        let mut tree = flat("<p>ab</p>");
        let caret = tree.resolve(Selection::caret(0), Extent::Text);
        tree.insert(caret.start, &[Node::text("X")]);
        assert_eq!(serialize(&tree.into_nodes()), "<p>Xab</p>");

        // After a break that ended up nested inside an emptied element.
        let mut tree = flat("a<b><br></b>");
        let caret = tree.resolve(Selection::caret(1), Extent::Text);
        tree.insert(caret.start, &[Node::text("X")]);
        assert_eq!(serialize(&tree.into_nodes()), "a<b><br>X</b>");
    }
}
