//! Dual-view synchronization.
//!
//! `DualView` owns the rendered view and the markup view and keeps them
//! consistent with a single-writer, full-resync strategy: whichever view was
//! last written to is the source of truth, and after every write the other
//! view is rebuilt from it in full. No diffing, no merging.

use crate::backend::{SelectionAdapter, SelectionCapabilities};
use crate::catalog::{Catalog, TransformDescriptor};
use crate::document::RenderedView;
use crate::html;
use crate::markup::MarkupView;
use crate::types::{HostFeatures, Selection};

/// Which view received direct input most recently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveView {
    #[default]
    Rendered,
    Markup,
}

/// The rendered view and markup view of one editing session.
#[derive(Debug, Clone)]
pub struct DualView {
    rendered: RenderedView,
    markup: MarkupView,
    active: ActiveView,
}

impl DualView {
    /// Take ownership of a rendered view and derive the markup view from it.
    pub fn new(rendered: RenderedView) -> Self {
        let markup = MarkupView::new(&rendered.serialize());
        Self {
            rendered,
            markup,
            active: ActiveView::Rendered,
        }
    }

    /// Seed the session from markup text. The markup view is active and
    /// keeps the text exactly as given.
    pub fn from_markup(markup: &str, host: HostFeatures) -> Self {
        Self {
            rendered: RenderedView::from_markup(markup, host),
            markup: MarkupView::new(markup),
            active: ActiveView::Markup,
        }
    }

    pub fn rendered(&self) -> &RenderedView {
        &self.rendered
    }

    pub fn markup(&self) -> &MarkupView {
        &self.markup
    }

    pub fn active(&self) -> ActiveView {
        self.active
    }

    // === Input events ===

    /// Focus the rendered view with a selection.
    pub fn select_rendered(&mut self, selection: Option<Selection>) {
        self.active = ActiveView::Rendered;
        self.rendered.set_selection(selection);
    }

    /// Add a discontiguous range to the rendered view's selection.
    pub fn add_rendered_range(&mut self, selection: Selection) {
        self.active = ActiveView::Rendered;
        self.rendered.add_range(selection);
    }

    /// Focus the markup view with a selection.
    pub fn select_markup(&mut self, selection: Selection) {
        self.active = ActiveView::Markup;
        self.markup.set_selection(selection);
    }

    /// Type into the rendered view's selection, then push to the markup view.
    pub fn input_rendered(&mut self, text: &str) {
        self.active = ActiveView::Rendered;
        SelectionAdapter::acquire(&mut self.rendered).replace_selection_with_text(text);
        // Typing leaves a caret, not a selection over the typed text.
        if let Some(sel) = self.rendered.selection() {
            self.rendered.set_selection(Some(Selection::caret(sel.end())));
        }
        self.push_rendered();
    }

    /// Type into the markup view's selection, then re-render.
    pub fn input_markup(&mut self, text: &str) {
        self.active = ActiveView::Markup;
        self.markup.replace_selection_with_text(text);
        self.pull_markup();
    }

    /// Replace the whole markup text, then re-render.
    pub fn set_markup(&mut self, markup: &str) {
        self.active = ActiveView::Markup;
        self.markup.set_content(markup);
        self.pull_markup();
    }

    // === Synchronization ===

    /// MarkupView := serialize(RenderedView).
    pub fn push_rendered(&mut self) {
        let markup = self.rendered.serialize();
        tracing::trace!(target: "toolbox::sync", len = markup.len(), "push rendered -> markup");
        self.markup.set_content(&markup);
    }

    /// RenderedView := parse(MarkupView). The rendered selection is dropped.
    pub fn pull_markup(&mut self) {
        let nodes = html::parse(&self.markup.content());
        tracing::trace!(target: "toolbox::sync", roots = nodes.len(), "pull markup -> rendered");
        self.rendered.set_nodes(nodes);
    }

    /// Rebuild the inactive view from the active one.
    pub fn sync(&mut self) {
        match self.active {
            ActiveView::Rendered => self.push_rendered(),
            ActiveView::Markup => self.pull_markup(),
        }
    }

    /// Whether both views describe the same tree.
    ///
    /// The markup view may hold text that does not round-trip (unclosed
    /// tags, entity spellings), so it is compared after a lenient parse.
    pub fn is_consistent(&self) -> bool {
        let rendered = self.rendered.serialize();
        let markup = html::serialize(&html::parse(&self.markup.content()));
        rendered == markup
    }

    /// Run a descriptor against the active view, then synchronize.
    ///
    /// Returns whether the descriptor reached the surface.
    pub fn apply(&mut self, catalog: &Catalog, descriptor: &TransformDescriptor) -> bool {
        let applied = match self.active {
            ActiveView::Rendered => {
                let mut adapter = SelectionAdapter::acquire(&mut self.rendered);
                catalog.execute(descriptor, &mut adapter)
            }
            ActiveView::Markup => catalog.execute(descriptor, &mut self.markup),
        };
        tracing::debug!(
            target: "toolbox::sync",
            action = %descriptor.name,
            active = ?self.active,
            applied,
            "synchronizing after action"
        );
        self.sync();
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_markup() {
        let views = DualView::new(RenderedView::from_markup(
            "<p>a &amp; b</p>",
            HostFeatures::MODERN,
        ));
        assert_eq!(views.markup().content(), "<p>a &amp; b</p>");
        assert_eq!(views.active(), ActiveView::Rendered);
        assert!(views.is_consistent());
    }

    #[test]
    fn test_from_markup_keeps_text_verbatim() {
        let views = DualView::from_markup("<p>open", HostFeatures::MODERN);
        assert_eq!(views.markup().content(), "<p>open");
        assert_eq!(views.rendered().serialize(), "<p>open</p>");
        assert_eq!(views.active(), ActiveView::Markup);
        assert!(views.is_consistent());
    }

    #[test]
    fn test_push_is_idempotent() {
        let mut views = DualView::from_markup("<b>x</b> y", HostFeatures::MODERN);
        views.push_rendered();
        let first = views.markup().content();
        views.push_rendered();
        assert_eq!(views.markup().content(), first);
    }

    #[test]
    fn test_input_rendered_pushes() {
        let mut views = DualView::new(RenderedView::from_markup("ab", HostFeatures::MODERN));
        views.select_rendered(Some(Selection::caret(1)));
        views.input_rendered("X");
        views.input_rendered("Y");
        assert_eq!(views.markup().content(), "aXYb");
        assert!(views.is_consistent());
    }

    #[test]
    fn test_input_markup_pulls_and_drops_rendered_selection() {
        let mut views = DualView::new(RenderedView::from_markup("ab", HostFeatures::MODERN));
        views.select_rendered(Some(Selection::new(0, 1)));
        views.select_markup(Selection::new(0, 2));
        views.input_markup("<i>ab</i>");
        assert_eq!(views.rendered().serialize(), "<i>ab</i>");
        assert!(views.rendered().selection().is_none());
        assert_eq!(views.active(), ActiveView::Markup);
    }

    #[test]
    fn test_set_markup_is_lenient() {
        let mut views = DualView::new(RenderedView::default());
        views.set_markup("<b>bold</i> text");
        assert_eq!(views.rendered().serialize(), "<b>bold text</b>");
        assert!(views.is_consistent());
    }

    #[test]
    fn test_inconsistent_after_direct_rendered_edit_without_push() {
        let mut views = DualView::new(RenderedView::from_markup("ab", HostFeatures::MODERN));
        views.select_rendered(Some(Selection::new(0, 2)));
        SelectionAdapter::acquire(&mut views.rendered).delete_selection();
        assert!(!views.is_consistent());
        views.sync();
        assert!(views.is_consistent());
        assert_eq!(views.markup().content(), "");
    }

    #[test]
    fn test_apply_on_markup_view_pulls() {
        let catalog = Catalog::default();
        let mut views = DualView::from_markup("say hello", HostFeatures::MODERN);
        views.select_markup(Selection::new(4, 9));
        let bold = catalog.get("makeTextBold").expect("registered action");
        assert!(views.apply(&catalog, bold));
        assert_eq!(views.markup().content(), "say <b>hello</b>");
        assert_eq!(views.rendered().serialize(), "say <b>hello</b>");
    }
}
