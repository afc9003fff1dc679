//! Core editor types: selections and host selection capabilities.
//!
//! These types are shared by the rendered view, the markup view and the
//! selection backends.

use std::ops::Range;

/// Text selection with anchor and focus positions.
///
/// The anchor is where the selection started, the focus is where it ends now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
/// Offsets are in chars (Unicode scalar values), never bytes.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where selection ends now
    pub focus: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    /// Create a collapsed selection (caret position).
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            focus: offset,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.focus)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.focus)
    }

    /// Check if the selection is collapsed (empty, caret only).
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Get the selection length.
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    /// Check if empty (same as is_collapsed).
    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Convert to a Range<usize> (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Check if the selection is backwards (focus before anchor).
    pub fn is_backwards(&self) -> bool {
        self.focus < self.anchor
    }

    /// Ordered copy with `anchor <= focus`.
    pub fn normalize(self) -> Self {
        Self::new(self.start(), self.end())
    }

    /// Clamp both ends to `max`.
    pub fn clamp(self, max: usize) -> Self {
        Self::new(self.anchor.min(max), self.focus.min(max))
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::caret(0)
    }
}

impl From<Range<usize>> for Selection {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// Which selection APIs the host environment exposes.
///
/// The host cannot change mid-session, but backends are still detected on
/// every acquisition rather than cached.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct HostFeatures {
    /// Range-based selection API (`getSelection`/`getRangeAt`).
    pub range_selection: bool,
    /// Legacy text-range API (`document.selection`/`createRange`/`pasteHTML`).
    pub text_range_selection: bool,
}

impl HostFeatures {
    /// Modern host: range API only.
    pub const MODERN: Self = Self {
        range_selection: true,
        text_range_selection: false,
    };

    /// Legacy host: text-range API only.
    pub const LEGACY: Self = Self {
        range_selection: false,
        text_range_selection: true,
    };

    /// Host with no selection API at all.
    pub const NONE: Self = Self {
        range_selection: false,
        text_range_selection: false,
    };
}

impl Default for HostFeatures {
    fn default() -> Self {
        Self::MODERN
    }
}
