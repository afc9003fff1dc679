//! Error types for the toolbox editor.
//!
//! Selection absence and malformed markup are never errors; these only cover
//! contract violations at the dispatch and registration seams.

use miette::Diagnostic;
use smol_str::SmolStr;

/// Errors from building a transformation catalog.
#[derive(thiserror::Error, Debug, Diagnostic, PartialEq, Eq)]
pub enum CatalogError {
    /// A descriptor with this name is already registered
    #[error("action `{0}` is already registered")]
    #[diagnostic(
        code(toolbox::duplicate_action),
        help("each action name can be registered once; pick another name")
    )]
    DuplicateAction(SmolStr),
}

/// Errors from the command dispatch entry point.
#[derive(thiserror::Error, Debug, Diagnostic, PartialEq, Eq)]
pub enum ToolbarError {
    /// No descriptor registered under this name
    #[error("unknown action `{name}`")]
    #[diagnostic(code(toolbox::unknown_action))]
    UnknownAction {
        name: String,
        #[help]
        advice: Option<String>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),
}

impl ToolbarError {
    pub(crate) fn unknown_action<'a>(
        name: &str,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let advice = known
            .into_iter()
            .find(|k| k.eq_ignore_ascii_case(name))
            .map(|k| format!("did you mean `{k}`?"));
        Self::UnknownAction {
            name: name.to_string(),
            advice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_action_suggests_case_mismatch() {
        let known = ["makeTextBold", "makeTextItalic"];
        let err = ToolbarError::unknown_action("maketextbold", known);
        assert_eq!(err.to_string(), "unknown action `maketextbold`");
        assert_eq!(
            err.help().map(|h| h.to_string()),
            Some("did you mean `makeTextBold`?".to_string())
        );

        let err = ToolbarError::unknown_action("explode", known);
        assert!(err.help().is_none());
    }

    #[test]
    fn test_duplicate_action_code() {
        let err = CatalogError::DuplicateAction(SmolStr::new("makeLink"));
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("toolbox::duplicate_action".to_string())
        );
    }
}
