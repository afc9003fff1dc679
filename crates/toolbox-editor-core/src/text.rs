//! Text buffer abstraction for the markup view.
//!
//! The `TextBuffer` trait provides a common interface for flat text storage,
//! so the markup view can splice constructed markup by char range without
//! caring how the text is stored.

use smol_str::{SmolStr, ToSmolStr};
use std::ops::Range;

/// A text buffer that supports efficient editing and offset conversion.
///
/// All offsets are in Unicode scalar values (chars), not bytes or UTF-16.
pub trait TextBuffer {
    /// Total length in bytes (UTF-8).
    fn len_bytes(&self) -> usize;

    /// Total length in chars (Unicode scalar values).
    fn len_chars(&self) -> usize;

    /// Check if empty.
    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Insert text at char offset.
    fn insert(&mut self, char_offset: usize, text: &str);

    /// Delete char range.
    fn delete(&mut self, char_range: Range<usize>);

    /// Replace char range with text.
    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        self.delete(char_range.clone());
        self.insert(char_range.start, text);
    }

    /// Get a slice as SmolStr. Returns None if range is invalid.
    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr>;

    /// Get character at offset. Returns None if out of bounds.
    fn char_at(&self, char_offset: usize) -> Option<char>;

    /// Convert entire buffer to String.
    fn to_string(&self) -> String;

    /// Replace the whole content.
    fn set_content(&mut self, text: &str) {
        let len = self.len_chars();
        self.replace(0..len, text);
    }
}

/// Ropey-backed text buffer.
///
/// Provides O(log n) editing operations and offset conversions.
#[derive(Clone, Debug, Default)]
pub struct EditorRope {
    rope: ropey::Rope,
}

impl EditorRope {
    /// Create a new empty rope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }

    /// Get a reference to the underlying rope.
    pub fn rope(&self) -> &ropey::Rope {
        &self.rope
    }
}

impl TextBuffer for EditorRope {
    fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        let offset = char_offset.min(self.rope.len_chars());
        self.rope.insert(offset, text);
    }

    fn delete(&mut self, char_range: Range<usize>) {
        let len = self.rope.len_chars();
        let end = char_range.end.min(len);
        let start = char_range.start.min(end);
        self.rope.remove(start..end);
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.start > char_range.end || char_range.end > self.len_chars() {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    fn char_at(&self, char_offset: usize) -> Option<char> {
        if char_offset >= self.len_chars() {
            return None;
        }
        Some(self.rope.char(char_offset))
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }

    fn set_content(&mut self, text: &str) {
        self.rope = ropey::Rope::from_str(text);
    }
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for EditorRope {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut rope = EditorRope::from_str("<p>hello world</p>");
        assert_eq!(rope.len_chars(), 18);

        rope.insert(8, " beautiful");
        assert_eq!(rope.to_string(), "<p>hello beautiful world</p>");

        rope.delete(8..18);
        assert_eq!(rope.to_string(), "<p>hello world</p>");
    }

    #[test]
    fn test_out_of_bounds_edits_clamp() {
        let mut rope = EditorRope::from_str("abc");
        rope.insert(10, "d");
        assert_eq!(rope.to_string(), "abcd");
        rope.delete(2..100);
        assert_eq!(rope.to_string(), "ab");
    }

    #[test]
    fn test_slice_and_char_at() {
        let rope = EditorRope::from_str("héllo");
        assert_eq!(rope.slice(0..2).as_deref(), Some("hé"));
        assert_eq!(rope.slice(3..9), None);
        assert_eq!(rope.char_at(1), Some('é'));
        assert_eq!(rope.char_at(5), None);
        assert_eq!(rope.len_bytes(), 6);
    }

    #[test]
    fn test_replace_and_set_content() {
        let mut rope = EditorRope::from_str("hello world");
        rope.replace(6..11, "rust");
        assert_eq!(rope.to_string(), "hello rust");
        rope.set_content("<b>x</b>");
        assert_eq!(rope.to_string(), "<b>x</b>");
    }
}
