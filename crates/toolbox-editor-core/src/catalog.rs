//! Transformation catalog.
//!
//! A registry of named transformation descriptors and the `execute` function
//! that applies one to any `SelectionCapabilities` surface. The logic is
//! surface-agnostic: the same descriptor runs against the rendered view's
//! selection backend or the markup view's textarea selection.

use smol_str::SmolStr;

use crate::backend::SelectionCapabilities;
use crate::error::CatalogError;

/// How a descriptor edits the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformKind {
    /// Wrap the selected text in one `tag` element.
    Wrap { tag: SmolStr },
    /// Replace the selection with `<open_tag>text</close_tag>`.
    ///
    /// `open_tag` is an opaque fragment that may carry attributes;
    /// `close_tag` is a bare name.
    WrapWithDistinctCloseTag { open_tag: SmolStr, close_tag: SmolStr },
    /// Insert a line break, then run `then` at the caret after it with the
    /// text that was selected before the break.
    LineBreak { then: Option<Box<TransformKind>> },
    Delete,
    RemoveFormatting,
}

impl TransformKind {
    /// Whether this kind inserts the selected text, and so does nothing when
    /// the selection is empty.
    fn consumes_text(&self) -> bool {
        match self {
            Self::Wrap { .. } | Self::WrapWithDistinctCloseTag { .. } => true,
            Self::LineBreak { then } => then.is_some(),
            Self::Delete | Self::RemoveFormatting => false,
        }
    }
}

/// A named, immutable transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformDescriptor {
    pub name: SmolStr,
    pub kind: TransformKind,
}

impl TransformDescriptor {
    pub fn new(name: impl Into<SmolStr>, kind: TransformKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn wrap(name: impl Into<SmolStr>, tag: impl Into<SmolStr>) -> Self {
        Self::new(name, TransformKind::Wrap { tag: tag.into() })
    }

    pub fn distinct(
        name: impl Into<SmolStr>,
        open_tag: impl Into<SmolStr>,
        close_tag: impl Into<SmolStr>,
    ) -> Self {
        Self::new(
            name,
            TransformKind::WrapWithDistinctCloseTag {
                open_tag: open_tag.into(),
                close_tag: close_tag.into(),
            },
        )
    }

    pub fn line_break(name: impl Into<SmolStr>, then: Option<TransformKind>) -> Self {
        Self::new(
            name,
            TransformKind::LineBreak {
                then: then.map(Box::new),
            },
        )
    }

    pub fn delete(name: impl Into<SmolStr>) -> Self {
        Self::new(name, TransformKind::Delete)
    }

    pub fn remove_formatting(name: impl Into<SmolStr>) -> Self {
        Self::new(name, TransformKind::RemoveFormatting)
    }
}

/// What happens to selected text before it is inserted as markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentPolicy {
    /// Insert the text as-is. Markup-looking text becomes markup.
    #[default]
    Verbatim,
    /// Escape `& < >` so the text stays text.
    EscapeText,
}

/// Inputs to the default catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Target of the `makeLink` anchor.
    pub link_href: String,
    /// Source of the `makeImage` image.
    pub image_src: String,
    pub content_policy: ContentPolicy,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            link_href: "https://example.com".to_string(),
            image_src: "https://example.com/image.png".to_string(),
            content_policy: ContentPolicy::Verbatim,
        }
    }
}

/// Registry of transformation descriptors, in registration order.
#[derive(Debug, Clone)]
pub struct Catalog {
    descriptors: Vec<TransformDescriptor>,
    content_policy: ContentPolicy,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(&CatalogSettings::default())
    }
}

impl Catalog {
    /// Build the default catalog.
    pub fn new(settings: &CatalogSettings) -> Self {
        Self {
            descriptors: default_descriptors(settings),
            content_policy: settings.content_policy,
        }
    }

    /// Build the default catalog plus extra descriptors.
    pub fn with_descriptors(
        settings: &CatalogSettings,
        extra: impl IntoIterator<Item = TransformDescriptor>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(settings);
        for descriptor in extra {
            catalog.register(descriptor)?;
        }
        Ok(catalog)
    }

    /// Register a descriptor. Names are unique.
    pub fn register(&mut self, descriptor: TransformDescriptor) -> Result<(), CatalogError> {
        if self.get(&descriptor.name).is_some() {
            return Err(CatalogError::DuplicateAction(descriptor.name));
        }
        tracing::debug!(
            target: "toolbox::catalog",
            name = %descriptor.name,
            kind = ?descriptor.kind,
            "registered action"
        );
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TransformDescriptor> {
        self.descriptors.iter().find(|d| d.name.as_str() == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn content_policy(&self) -> ContentPolicy {
        self.content_policy
    }

    /// Execute a descriptor against a selection surface.
    ///
    /// Returns true if the descriptor reached the surface. An empty
    /// selection makes text-consuming descriptors return false untouched;
    /// the surface itself may still turn a call into a no-op.
    pub fn execute<S>(&self, descriptor: &TransformDescriptor, surface: &mut S) -> bool
    where
        S: SelectionCapabilities + ?Sized,
    {
        let text = surface.selected_text();
        if text.is_empty() && descriptor.kind.consumes_text() {
            tracing::debug!(
                target: "toolbox::catalog",
                action = %descriptor.name,
                "empty selection, skipping"
            );
            return false;
        }

        let content = match self.content_policy {
            ContentPolicy::Verbatim => text,
            ContentPolicy::EscapeText => html_escape::encode_text(&text).into_owned(),
        };
        tracing::debug!(
            target: "toolbox::catalog",
            action = %descriptor.name,
            content = %content,
            "executing action"
        );
        apply(&descriptor.kind, &content, surface);
        true
    }
}

fn apply<S>(kind: &TransformKind, content: &str, surface: &mut S)
where
    S: SelectionCapabilities + ?Sized,
{
    match kind {
        TransformKind::Wrap { tag } => surface.wrap_selection_with_element(tag, content),
        TransformKind::WrapWithDistinctCloseTag {
            open_tag,
            close_tag,
        } => surface.replace_selection_with_markup(open_tag, close_tag, content),
        TransformKind::LineBreak { then } => {
            surface.insert_line_break_at_selection();
            if let Some(next) = then {
                apply(next, content, surface);
            }
        }
        TransformKind::Delete => surface.delete_selection(),
        TransformKind::RemoveFormatting => surface.remove_formatting_at_selection(),
    }
}

fn default_descriptors(settings: &CatalogSettings) -> Vec<TransformDescriptor> {
    let mut out = Vec::new();

    for level in 1..=4 {
        out.push(TransformDescriptor::wrap(
            format!("makeTextH{level}"),
            format!("h{level}"),
        ));
    }
    for (name, align) in [
        ("Left", "left"),
        ("Center", "center"),
        ("Right", "right"),
        ("Justify", "justify"),
    ] {
        out.push(TransformDescriptor::distinct(
            format!("makeTextAlign{name}"),
            format!(r#"p class="text-{align}""#),
            "p",
        ));
    }
    for (name, tag) in [
        ("makeTextBold", "b"),
        ("makeTextItalic", "i"),
        ("makeTextUnderline", "u"),
        ("makeTextStrikethrough", "s"),
    ] {
        out.push(TransformDescriptor::wrap(name, tag));
    }

    out.push(TransformDescriptor::line_break(
        "makeTextQuote",
        Some(TransformKind::WrapWithDistinctCloseTag {
            open_tag: "blockquote".into(),
            close_tag: "blockquote".into(),
        }),
    ));
    out.push(TransformDescriptor::distinct(
        "makeCodeBox",
        r#"div class="well" style="color: white;""#,
        "div",
    ));
    for (name, variant) in [
        ("Success", "success"),
        ("Info", "info"),
        ("Warning", "warning"),
        ("Danger", "danger"),
    ] {
        out.push(TransformDescriptor::distinct(
            format!("makeAlert{name}"),
            format!(r#"div class="alert alert-{variant}" role="alert""#),
            "div",
        ));
    }

    out.push(TransformDescriptor::distinct(
        "makeLink",
        format!(r#"a target="_blank" href="{}""#, settings.link_href),
        "a",
    ));
    // Closes a void element on purpose; parsers drop the stray `</img>`.
    out.push(TransformDescriptor::distinct(
        "makeImage",
        format!(r#"img src="{}" class="img-responsive""#, settings.image_src),
        "img",
    ));

    out.push(TransformDescriptor::line_break("makeNewLine", None));
    out.push(TransformDescriptor::delete("deleteText"));
    out.push(TransformDescriptor::remove_formatting("remoteTextTags"));
    out.push(TransformDescriptor::remove_formatting("removeTextTags"));
    out
}
