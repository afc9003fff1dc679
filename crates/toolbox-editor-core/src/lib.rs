//! toolbox-editor-core: selection-anchored markup transformations.
//!
//! This crate provides:
//! - `RenderedView` - structured document tree with text-offset selections
//! - `MarkupView` - rope-backed raw markup with a textarea-style selection
//! - `SelectionAdapter` - range / legacy text-range backends behind `SelectionCapabilities`
//! - `Catalog` - named transformation descriptors and their execution
//! - `DualView` - full-resync synchronization between the two views
//! - `Toolbar` - dispatch by action name

pub mod backend;
pub mod catalog;
pub mod document;
pub mod dom;
pub mod error;
pub mod html;
pub mod markup;
mod range;
pub mod sync;
pub mod text;
pub mod toolbar;
pub mod types;

pub use backend::{BackendKind, SelectionAdapter, SelectionCapabilities, tagged_markup};
pub use catalog::{Catalog, CatalogSettings, ContentPolicy, TransformDescriptor, TransformKind};
pub use document::RenderedView;
pub use dom::{Attribute, Element, Node};
pub use error::{CatalogError, ToolbarError};
pub use markup::MarkupView;
pub use smol_str::SmolStr;
pub use sync::{ActiveView, DualView};
pub use text::{EditorRope, TextBuffer};
pub use toolbar::Toolbar;
pub use types::{HostFeatures, Selection};
