//! Command dispatch: the entry point toolbar buttons call by action name.

use crate::catalog::{Catalog, TransformDescriptor};
use crate::error::ToolbarError;
use crate::sync::DualView;

/// A catalog bound to the views it edits.
#[derive(Debug, Clone)]
pub struct Toolbar {
    catalog: Catalog,
    views: DualView,
}

impl Toolbar {
    pub fn new(catalog: Catalog, views: DualView) -> Self {
        Self { catalog, views }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn views(&self) -> &DualView {
        &self.views
    }

    /// Mutable access for input events (selection, typing).
    pub fn views_mut(&mut self) -> &mut DualView {
        &mut self.views
    }

    pub fn into_views(self) -> DualView {
        self.views
    }

    /// Registered action names, in registration order.
    pub fn actions(&self) -> Vec<&str> {
        self.catalog.names().collect()
    }

    /// Bind another descriptor to this toolbar.
    pub fn register(&mut self, descriptor: TransformDescriptor) -> Result<(), ToolbarError> {
        self.catalog.register(descriptor)?;
        Ok(())
    }

    /// Run the named action against the active view and synchronize.
    ///
    /// Unknown names are rejected before anything is touched. `Ok(false)`
    /// means the action was skipped (empty selection), not that it failed.
    pub fn on_action(&mut self, name: &str) -> Result<bool, ToolbarError> {
        let Some(descriptor) = self.catalog.get(name) else {
            tracing::warn!(target: "toolbox::catalog", name, "unknown action");
            return Err(ToolbarError::unknown_action(name, self.catalog.names()));
        };
        Ok(self.views.apply(&self.catalog, descriptor))
    }
}
