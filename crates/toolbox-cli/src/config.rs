//! KDL configuration for the toolbox CLI.
//!
//! ```kdl
//! link-url "https://wiki.example.org"
//! image-url "/static/banner.png"
//! content-policy "escape-text"
//! action "makeTextMark" kind="wrap" open="mark"
//! action "makeNote" kind="distinct" open="aside class=\"note\"" close="aside"
//! ```

use std::path::{Path, PathBuf};

use kdl::{KdlDocument, KdlNode};
use miette::Diagnostic;
use toolbox_editor_core::{
    Catalog, CatalogError, CatalogSettings, ContentPolicy, TransformDescriptor, TransformKind,
};

#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("could not read config file {}", path.display())]
    #[diagnostic(code(toolbox::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid KDL in {}", path.display())]
    #[diagnostic(code(toolbox::config::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: kdl::KdlError,
    },

    #[error("`{node}` is missing {what}")]
    #[diagnostic(code(toolbox::config::missing_value))]
    MissingValue { node: String, what: &'static str },

    #[error("`{node}` has invalid value `{value}`")]
    #[diagnostic(code(toolbox::config::invalid_value), help("expected one of: {expected}"))]
    InvalidValue {
        node: String,
        value: String,
        expected: &'static str,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),
}

/// Catalog settings plus extra actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub settings: CatalogSettings,
    pub actions: Vec<TransformDescriptor>,
}

impl Config {
    /// Load from an explicit path, or from the default location if present.
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::read(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => {
                    tracing::debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!("loading config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: KdlDocument = text.parse().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_document(&doc)
    }

    pub fn from_document(doc: &KdlDocument) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for node in doc.nodes() {
            let name = node.name().value();
            match name {
                "link-url" => config.settings.link_href = required_arg(node, "a URL")?.to_string(),
                "image-url" => config.settings.image_src = required_arg(node, "a URL")?.to_string(),
                "content-policy" => {
                    config.settings.content_policy = match required_arg(node, "a policy")? {
                        "verbatim" => ContentPolicy::Verbatim,
                        "escape-text" => ContentPolicy::EscapeText,
                        other => {
                            return Err(ConfigError::InvalidValue {
                                node: name.to_string(),
                                value: other.to_string(),
                                expected: "verbatim, escape-text",
                            });
                        }
                    }
                }
                "action" => config.actions.push(action(node)?),
                other => tracing::warn!("ignoring unknown config node `{other}`"),
            }
        }

        Ok(config)
    }

    /// Build the catalog: defaults first, then configured actions in order.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        Ok(Catalog::with_descriptors(
            &self.settings,
            self.actions.iter().cloned(),
        )?)
    }
}

/// `<config dir>/toolbox/config.kdl`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("toolbox").join("config.kdl"))
}

fn action(node: &KdlNode) -> Result<TransformDescriptor, ConfigError> {
    let name = required_arg(node, "an action name")?;
    let kind = prop(node, "kind").ok_or_else(|| missing(name, "kind="))?;
    let open = prop(node, "open");
    let close = prop(node, "close");

    let kind = match kind {
        "wrap" => TransformKind::Wrap {
            tag: open.ok_or_else(|| missing(name, "open="))?.into(),
        },
        "distinct" => distinct(name, open, close)?,
        "line-break" => TransformKind::LineBreak {
            then: match open {
                Some(_) => Some(Box::new(distinct(name, open, close)?)),
                None => None,
            },
        },
        "delete" => TransformKind::Delete,
        "remove-formatting" => TransformKind::RemoveFormatting,
        other => {
            return Err(ConfigError::InvalidValue {
                node: name.to_string(),
                value: other.to_string(),
                expected: "wrap, distinct, line-break, delete, remove-formatting",
            });
        }
    };
    Ok(TransformDescriptor::new(name, kind))
}

fn distinct(
    name: &str,
    open: Option<&str>,
    close: Option<&str>,
) -> Result<TransformKind, ConfigError> {
    Ok(TransformKind::WrapWithDistinctCloseTag {
        open_tag: open.ok_or_else(|| missing(name, "open="))?.into(),
        close_tag: close.ok_or_else(|| missing(name, "close="))?.into(),
    })
}

fn missing(node: &str, what: &'static str) -> ConfigError {
    ConfigError::MissingValue {
        node: node.to_string(),
        what,
    }
}

fn required_arg<'a>(node: &'a KdlNode, what: &'static str) -> Result<&'a str, ConfigError> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| missing(node.name().value(), what))
}

fn prop<'a>(node: &'a KdlNode, key: &str) -> Option<&'a str> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(key))
        .and_then(|e| e.value().as_string())
}
