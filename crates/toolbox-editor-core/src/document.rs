//! The rendered view: the structured, directly editable document.
//!
//! `RenderedView` owns the root nodes of the editable surface, the live
//! selection ranges scoped to it, and the description of which selection
//! APIs the host offers. Backends borrow it mutably for the duration of a
//! single operation.

use std::ops::Range;

use crate::dom::{self, Node};
use crate::html;
use crate::range::{Extent, FlatTree};
use crate::types::{HostFeatures, Selection};

/// Structured document surface with its current selection.
#[derive(Debug, Clone, Default)]
pub struct RenderedView {
    nodes: Vec<Node>,
    ranges: Vec<Selection>,
    host: HostFeatures,
}

impl RenderedView {
    /// Create a view over existing content.
    pub fn new(mut nodes: Vec<Node>, host: HostFeatures) -> Self {
        dom::normalize(&mut nodes);
        Self {
            nodes,
            ranges: Vec::new(),
            host,
        }
    }

    /// Create a view by parsing markup.
    pub fn from_markup(markup: &str, host: HostFeatures) -> Self {
        Self::new(html::parse(markup), host)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Replace the whole content. Any selection is dropped.
    pub fn set_nodes(&mut self, mut nodes: Vec<Node>) {
        dom::normalize(&mut nodes);
        self.nodes = nodes;
        self.ranges.clear();
    }

    pub fn host(&self) -> HostFeatures {
        self.host
    }

    /// Serialized markup of the whole view.
    pub fn serialize(&self) -> String {
        html::serialize(&self.nodes)
    }

    /// Plain text of the whole view.
    pub fn text_content(&self) -> String {
        dom::text_content(&self.nodes)
    }

    /// Length of the plain text in chars.
    pub fn text_len(&self) -> usize {
        self.nodes.iter().map(Node::text_len).sum()
    }

    // === Selection ===

    /// The primary (first) range, if any.
    pub fn selection(&self) -> Option<Selection> {
        self.ranges.first().copied()
    }

    /// All ranges of the selection, in the order they were added.
    pub fn ranges(&self) -> &[Selection] {
        &self.ranges
    }

    /// Replace the selection with a single range, or clear it.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.ranges.clear();
        if let Some(sel) = selection {
            self.ranges.push(sel.clamp(self.text_len()));
        }
    }

    /// Add another (discontiguous) range to the selection.
    pub fn add_range(&mut self, selection: Selection) {
        self.ranges.push(selection.clamp(self.text_len()));
    }

    // === Range primitives for backends ===

    /// Plain text covered by a selection.
    pub(crate) fn text_in(&self, selection: Selection) -> String {
        let tree = FlatTree::from_nodes(&self.nodes);
        let range = tree.resolve(selection, Extent::Text);
        tree.text_in(range)
    }

    /// Markup covered by a selection, partially selected ancestors cloned.
    ///
    /// An element whose text is entirely selected comes back whole.
    pub(crate) fn markup_in(&self, selection: Selection) -> String {
        let tree = FlatTree::from_nodes(&self.nodes);
        let range = tree.resolve(selection, Extent::Covering);
        tree.markup_in(range)
    }

    /// Delete the selected content and insert `nodes` at the collapse point.
    ///
    /// With `Extent::Text` the elements around the selected text stay in
    /// place; `Extent::Covering` also replaces fully selected elements.
    /// Returns the text offsets spanned by the inserted content.
    pub(crate) fn replace_range(
        &mut self,
        selection: Selection,
        nodes: &[Node],
        extent: Extent,
    ) -> Range<usize> {
        let mut tree = FlatTree::from_nodes(&self.nodes);
        let range = tree.resolve(selection, extent);
        tracing::trace!(
            target: "toolbox::selection",
            ?selection,
            tokens = ?range,
            inserted = nodes.len(),
            "replacing range"
        );
        let collapse = tree.delete(range);
        let start = tree.offset_at(collapse);
        let after = tree.insert(collapse, nodes);
        let end = tree.offset_at(after);
        self.nodes = tree.into_nodes();
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_markup_round_trip() {
        let view = RenderedView::from_markup("<p>hi <b>there</b></p>", HostFeatures::MODERN);
        assert_eq!(view.serialize(), "<p>hi <b>there</b></p>");
        assert_eq!(view.text_content(), "hi there");
        assert_eq!(view.text_len(), 8);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut view = RenderedView::from_markup("abc", HostFeatures::MODERN);
        view.set_selection(Some(Selection::new(1, 10)));
        assert_eq!(view.selection(), Some(Selection::new(1, 3)));
        view.add_range(Selection::new(0, 1));
        assert_eq!(view.ranges().len(), 2);
        view.set_selection(None);
        assert!(view.selection().is_none());
    }

    #[test]
    fn test_replace_range_reports_inserted_span() {
        let mut view = RenderedView::from_markup("hello world", HostFeatures::MODERN);
        let span = view.replace_range(Selection::new(6, 11), &[Node::text("rust!")], Extent::Text);
        assert_eq!(span, 6..11);
        assert_eq!(view.serialize(), "hello rust!");
    }

    #[test]
    fn test_replace_range_extent() {
        let mut view = RenderedView::from_markup("<h1>Title</h1>", HostFeatures::MODERN);
        view.replace_range(Selection::new(0, 5), &[Node::text("Intro")], Extent::Text);
        assert_eq!(view.serialize(), "<h1>Intro</h1>");
        view.replace_range(Selection::new(0, 5), &[Node::text("Intro")], Extent::Covering);
        assert_eq!(view.serialize(), "Intro");
    }

    #[test]
    fn test_set_nodes_drops_selection() {
        let mut view = RenderedView::from_markup("abc", HostFeatures::MODERN);
        view.set_selection(Some(Selection::new(0, 2)));
        view.set_nodes(html::parse("<i>x</i>"));
        assert!(view.ranges().is_empty());
        assert_eq!(view.serialize(), "<i>x</i>");
    }
}
