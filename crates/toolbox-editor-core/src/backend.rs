//! Selection backends for the rendered view.
//!
//! Hosts expose one of two selection APIs: a range-based one (multiple
//! ranges, node insertion, explicit caret control) or a legacy text-range
//! one (a single range edited by pasting markup strings). `SelectionAdapter`
//! detects which one is present each time it is acquired and presents both
//! through the `SelectionCapabilities` interface. A missing API, a missing
//! selection or a collapsed selection are never errors: reads return an
//! empty string and edits do nothing.

use smol_str::SmolStr;

use crate::document::RenderedView;
use crate::dom::{Element, Node, is_valid_element_name};
use crate::html;
use crate::range::Extent;
use crate::types::Selection;

/// Operations a transformation can perform against a selection.
///
/// Implemented by both rendered-view backends and by the markup view, so the
/// transformation catalog can run against whichever view is active.
pub trait SelectionCapabilities {
    /// Plain text of the current selection, empty if there is none.
    fn selected_text(&self) -> String;

    /// Serialized markup of the current selection, empty if there is none.
    fn selected_markup(&self) -> String;

    /// Delete the selection and insert `text` as plain text.
    fn replace_selection_with_text(&mut self, text: &str);

    /// Delete the selection and insert `<open_tag>content</close_tag>`.
    ///
    /// `open_tag` may carry attributes (`p class="text-left"`), `close_tag`
    /// is a bare name. The string is built verbatim before parsing.
    fn replace_selection_with_markup(&mut self, open_tag: &str, close_tag: &str, content: &str);

    /// Delete the selection and insert a `tag_name` element whose inner
    /// markup is `content`.
    fn wrap_selection_with_element(&mut self, tag_name: &str, content: &str);

    /// Delete the selection, insert a line break and put the caret after it.
    fn insert_line_break_at_selection(&mut self);

    /// Delete the selection and collapse to the deletion point.
    fn delete_selection(&mut self);

    /// Re-insert every selected range as plain text, dropping its markup.
    fn remove_formatting_at_selection(&mut self);
}

/// Which backend an adapter was bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Range,
    TextRange,
    Unavailable,
}

/// Capability handle bound to the host's selection API for one operation.
pub enum SelectionAdapter<'a> {
    Range(RangeBackend<'a>),
    TextRange(TextRangeBackend<'a>),
    Unavailable,
}

impl<'a> SelectionAdapter<'a> {
    /// Detect the host's selection API and bind to it.
    ///
    /// The range API wins when both are present.
    pub fn acquire(view: &'a mut RenderedView) -> Self {
        let host = view.host();
        let adapter = if host.range_selection {
            Self::Range(RangeBackend { view })
        } else if host.text_range_selection {
            Self::TextRange(TextRangeBackend { view })
        } else {
            tracing::warn!(target: "toolbox::selection", "host exposes no selection API");
            Self::Unavailable
        };
        tracing::trace!(
            target: "toolbox::selection",
            backend = ?adapter.kind(),
            "acquired selection backend"
        );
        adapter
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Range(_) => BackendKind::Range,
            Self::TextRange(_) => BackendKind::TextRange,
            Self::Unavailable => BackendKind::Unavailable,
        }
    }

    fn backend(&self) -> Option<&dyn SelectionCapabilities> {
        match self {
            Self::Range(b) => Some(b),
            Self::TextRange(b) => Some(b),
            Self::Unavailable => None,
        }
    }

    fn backend_mut(&mut self) -> Option<&mut dyn SelectionCapabilities> {
        match self {
            Self::Range(b) => Some(b),
            Self::TextRange(b) => Some(b),
            Self::Unavailable => None,
        }
    }
}

impl SelectionCapabilities for SelectionAdapter<'_> {
    fn selected_text(&self) -> String {
        self.backend()
            .map(|b| b.selected_text())
            .unwrap_or_default()
    }

    fn selected_markup(&self) -> String {
        self.backend()
            .map(|b| b.selected_markup())
            .unwrap_or_default()
    }

    fn replace_selection_with_text(&mut self, text: &str) {
        if let Some(b) = self.backend_mut() {
            b.replace_selection_with_text(text);
        }
    }

    fn replace_selection_with_markup(&mut self, open_tag: &str, close_tag: &str, content: &str) {
        if let Some(b) = self.backend_mut() {
            b.replace_selection_with_markup(open_tag, close_tag, content);
        }
    }

    fn wrap_selection_with_element(&mut self, tag_name: &str, content: &str) {
        if let Some(b) = self.backend_mut() {
            b.wrap_selection_with_element(tag_name, content);
        }
    }

    fn insert_line_break_at_selection(&mut self) {
        if let Some(b) = self.backend_mut() {
            b.insert_line_break_at_selection();
        }
    }

    fn delete_selection(&mut self) {
        if let Some(b) = self.backend_mut() {
            b.delete_selection();
        }
    }

    fn remove_formatting_at_selection(&mut self) {
        if let Some(b) = self.backend_mut() {
            b.remove_formatting_at_selection();
        }
    }
}

/// Build the verbatim `<open>content</close>` string both backends parse.
pub fn tagged_markup(open_tag: &str, close_tag: &str, content: &str) -> String {
    format!("<{open_tag}>{content}</{close_tag}>")
}

// === Range backend ===

/// Range-based backend.
///
/// Reads and edits act on the first range; only formatting removal visits
/// the others. Inserted content stays selected, matching
/// node insertion into a collapsed range.
pub struct RangeBackend<'a> {
    view: &'a mut RenderedView,
}

impl RangeBackend<'_> {
    fn insert_nodes(&mut self, nodes: &[Node]) {
        let Some(range) = self.view.selection() else {
            return;
        };
        let span = self.view.replace_range(range, nodes, Extent::Text);
        self.view.set_selection(Some(Selection::from(span)));
    }
}

impl SelectionCapabilities for RangeBackend<'_> {
    fn selected_text(&self) -> String {
        self.view
            .selection()
            .map(|range| self.view.text_in(range))
            .unwrap_or_default()
    }

    fn selected_markup(&self) -> String {
        self.view
            .selection()
            .map(|range| self.view.markup_in(range))
            .unwrap_or_default()
    }

    fn replace_selection_with_text(&mut self, text: &str) {
        self.insert_nodes(&[Node::text(text)]);
    }

    fn replace_selection_with_markup(&mut self, open_tag: &str, close_tag: &str, content: &str) {
        // Parsed through a detached container, then moved in as a fragment.
        let fragment = html::parse(&tagged_markup(open_tag, close_tag, content));
        self.insert_nodes(&fragment);
    }

    fn wrap_selection_with_element(&mut self, tag_name: &str, content: &str) {
        if !is_valid_element_name(tag_name) {
            tracing::warn!(
                target: "toolbox::selection",
                tag_name,
                "cannot create element with this name, skipping wrap"
            );
            return;
        }
        let mut wrapper = Element::new(SmolStr::new(tag_name.to_ascii_lowercase()));
        if !wrapper.is_void() {
            wrapper.children = html::parse(content);
        }
        self.insert_nodes(&[Node::Element(wrapper)]);
    }

    fn insert_line_break_at_selection(&mut self) {
        let Some(range) = self.view.selection() else {
            return;
        };
        let span = self
            .view
            .replace_range(range, &[Node::Element(Element::new("br"))], Extent::Text);
        // A caret at this offset resolves past the break.
        self.view.set_selection(Some(Selection::caret(span.end)));
    }

    fn delete_selection(&mut self) {
        let Some(range) = self.view.selection() else {
            return;
        };
        let span = self.view.replace_range(range, &[], Extent::Text);
        self.view.set_selection(Some(Selection::caret(span.start)));
    }

    fn remove_formatting_at_selection(&mut self) {
        // Text offsets survive this edit, so each stored range stays valid.
        let ranges = self.view.ranges().to_vec();
        for range in &ranges {
            if range.is_collapsed() {
                continue;
            }
            let text = self.view.text_in(*range);
            self.view
                .replace_range(*range, &[Node::Text(text)], Extent::Covering);
        }
        self.view.set_selection(None);
        for range in ranges {
            self.view.add_range(range);
        }
    }
}

// === Text-range backend ===

/// Legacy text-range backend.
///
/// Only one range exists. Every edit pastes a markup string, after which the
/// range collapses to the end of the pasted content.
pub struct TextRangeBackend<'a> {
    view: &'a mut RenderedView,
}

impl TextRangeBackend<'_> {
    fn paste_nodes(&mut self, nodes: &[Node]) {
        let Some(range) = self.view.selection() else {
            return;
        };
        let span = self.view.replace_range(range, nodes, Extent::Text);
        self.view.set_selection(Some(Selection::caret(span.end)));
    }

    fn paste_html(&mut self, markup: &str) {
        self.paste_nodes(&html::parse(markup));
    }
}

impl SelectionCapabilities for TextRangeBackend<'_> {
    fn selected_text(&self) -> String {
        self.view
            .selection()
            .map(|range| self.view.text_in(range))
            .unwrap_or_default()
    }

    fn selected_markup(&self) -> String {
        self.view
            .selection()
            .map(|range| self.view.markup_in(range))
            .unwrap_or_default()
    }

    fn replace_selection_with_text(&mut self, text: &str) {
        self.paste_nodes(&[Node::text(text)]);
    }

    fn replace_selection_with_markup(&mut self, open_tag: &str, close_tag: &str, content: &str) {
        self.paste_html(&tagged_markup(open_tag, close_tag, content));
    }

    fn wrap_selection_with_element(&mut self, tag_name: &str, content: &str) {
        // No element construction here: the name goes straight into the
        // pasted string, so attribute-bearing names still produce markup.
        self.paste_html(&tagged_markup(tag_name, tag_name, content));
    }

    fn insert_line_break_at_selection(&mut self) {
        self.paste_html("<br>");
    }

    fn delete_selection(&mut self) {
        let Some(range) = self.view.selection() else {
            return;
        };
        let span = self.view.replace_range(range, &[], Extent::Text);
        self.view.set_selection(Some(Selection::caret(span.start)));
    }

    fn remove_formatting_at_selection(&mut self) {
        let Some(range) = self.view.selection() else {
            return;
        };
        if range.is_collapsed() {
            return;
        }
        let text = self.view.text_in(range);
        let span = self
            .view
            .replace_range(range, &[Node::Text(text)], Extent::Covering);
        self.view.set_selection(Some(Selection::caret(span.end)));
    }
}
