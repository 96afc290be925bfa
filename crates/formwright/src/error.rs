//! Error types for forms.
//!
//! User input failing a constraint is never an error: it ends up in a
//! [`ViolationTree`](crate::ViolationTree). The types here cover misuse of the
//! builder, broken configuration and renderer failures.

use std::path::PathBuf;

use thiserror::Error;

/// Structural misuse of the form builder.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Two fields share the same name.
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    /// A field sub-builder was dropped without calling `add()`.
    #[error("field was never committed with add(): {0}")]
    UncommittedField(String),

    /// An option-bearing field (select, radio) was committed without options.
    #[error("field {0} requires at least one option")]
    MissingOptions(String),

    /// A `pattern()` modifier received an invalid regular expression.
    #[error("invalid pattern for field {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// The builder referenced something that is not configured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Programmer or integration errors, as opposed to bad user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Constraint kind or named callback that nothing registered.
    #[error("unknown constraint: {0}")]
    UnknownConstraint(String),

    /// Field type that is neither built in nor registered.
    #[error("unknown field type: {0}")]
    UnknownFieldType(String),

    /// Renderer name without a registered template adapter.
    #[error("no template adapter registered as {0}")]
    UnknownAdapter(String),

    /// A value constraint attached to the form instead of a field.
    #[error("{0} constraint needs a field; form-level rules must be callbacks")]
    FormLevelConstraint(String),

    /// Theme name that is not registered with the renderer.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// A configuration value could not be interpreted.
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },

    /// A declarative schema could not be parsed.
    #[error("invalid form schema: {0}")]
    Schema(String),
}

impl ConfigurationError {
    pub(crate) fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Failures inside a template adapter or an output encoder.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template engine rejected or failed to render a template.
    #[error("template engine error: {0}")]
    Engine(String),

    /// Reading a template failed.
    #[error("template I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed.
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML encoding failed.
    #[error("XML encoding error: {0}")]
    Xml(String),
}

/// Failures while loading a translation catalog.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax error.
    #[error("invalid YAML translations: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax error.
    #[error("invalid JSON translations: {0}")]
    Json(#[from] serde_json::Error),

    /// The document root is not a key/value mapping.
    #[error("translation file {0} is not a mapping")]
    NotAMapping(PathBuf),

    /// No loader handles this file extension.
    #[error("unsupported translation file: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Top-level error for form operations.
#[derive(Debug, Error)]
pub enum FormError {
    /// Builder misuse.
    #[error(transparent)]
    Builder(#[from] BuilderError),

    /// Configuration error.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Rendering failed as a whole.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Translation catalog failed to load.
    #[error(transparent)]
    Translation(#[from] TranslationError),
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;
