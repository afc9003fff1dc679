//! The markup view: the flat serialized-markup representation.
//!
//! Behaves like a textarea. Its selection is a pair of char offsets into the
//! raw markup string, and transformations splice constructed markup strings
//! in place of the selected substring.

use crate::backend::{SelectionCapabilities, tagged_markup};
use crate::dom;
use crate::html;
use crate::text::{EditorRope, TextBuffer};
use crate::types::Selection;

/// Raw markup buffer with a textarea-style selection.
#[derive(Debug, Clone, Default)]
pub struct MarkupView {
    buffer: EditorRope,
    selection: Selection,
}

impl MarkupView {
    pub fn new(markup: &str) -> Self {
        Self {
            buffer: EditorRope::from_str(markup),
            selection: Selection::default(),
        }
    }

    /// The full markup text.
    pub fn content(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    /// Replace the whole text. The selection is clamped to the new length.
    pub fn set_content(&mut self, markup: &str) {
        self.buffer.set_content(markup);
        self.selection = self.selection.clamp(self.buffer.len_chars());
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp(self.buffer.len_chars());
    }

    /// Replace the selected substring and put the caret after the insertion.
    fn splice(&mut self, text: &str) {
        let range = self.selection.to_range();
        self.buffer.replace(range.clone(), text);
        self.selection = Selection::caret(range.start + text.chars().count());
    }
}

impl SelectionCapabilities for MarkupView {
    fn selected_text(&self) -> String {
        self.buffer
            .slice(self.selection.to_range())
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    fn selected_markup(&self) -> String {
        self.selected_text()
    }

    fn replace_selection_with_text(&mut self, text: &str) {
        self.splice(text);
    }

    fn replace_selection_with_markup(&mut self, open_tag: &str, close_tag: &str, content: &str) {
        self.splice(&tagged_markup(open_tag, close_tag, content));
    }

    fn wrap_selection_with_element(&mut self, tag_name: &str, content: &str) {
        self.splice(&tagged_markup(tag_name, tag_name, content));
    }

    fn insert_line_break_at_selection(&mut self) {
        self.splice("<br>");
    }

    fn delete_selection(&mut self) {
        self.splice("");
    }

    fn remove_formatting_at_selection(&mut self) {
        if self.selection.is_collapsed() {
            return;
        }
        let text = dom::text_content(&html::parse(&self.selected_text()));
        self.splice(&html_escape::encode_text(&text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup(content: &str, start: usize, end: usize) -> MarkupView {
        let mut view = MarkupView::new(content);
        view.set_selection(Selection::new(start, end));
        view
    }

    #[test]
    fn test_wrap_splices_and_moves_caret_after_close_tag() {
        let mut view = markup("<p>say hello</p>", 7, 12);
        let text = view.selected_text();
        assert_eq!(text, "hello");
        view.wrap_selection_with_element("h1", &text);
        assert_eq!(view.content(), "<p>say <h1>hello</h1></p>");
        assert_eq!(view.selection(), Selection::caret(21));
    }

    #[test]
    fn test_distinct_close_tag() {
        let mut view = markup("note", 0, 4);
        view.replace_selection_with_markup(r#"p class="text-right""#, "p", "note");
        assert_eq!(view.content(), r#"<p class="text-right">note</p>"#);
    }

    #[test]
    fn test_remove_formatting_strips_markup_and_escapes() {
        let mut view = markup("x<b>a &lt; b</b>y", 1, 16);
        assert_eq!(view.selected_markup(), "<b>a &lt; b</b>");
        view.remove_formatting_at_selection();
        assert_eq!(view.content(), "xa &lt; by");
    }

    #[test]
    fn test_line_break_and_delete() {
        let mut view = markup("abcd", 1, 3);
        view.delete_selection();
        assert_eq!(view.content(), "ad");
        assert_eq!(view.selection(), Selection::caret(1));
        view.insert_line_break_at_selection();
        assert_eq!(view.content(), "a<br>d");
    }

    #[test]
    fn test_set_content_clamps_selection() {
        let mut view = markup("abcdef", 2, 6);
        view.set_content("ab");
        assert_eq!(view.selection(), Selection::new(2, 2));
    }
}
