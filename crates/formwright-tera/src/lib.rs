//! # formwright-tera
//!
//! A [`TemplateAdapter`] backed by [Tera](https://keats.github.io/tera/).
//!
//! Templates live under one root directory with a subdirectory per build
//! format (theme name), e.g. `templates/bootstrap5/text.tpl`, with
//! `templates/Generic/` as the fallback. Each template sees the field's
//! [`FieldContext`] as its variables: `{{ name }}`, `{{ label }}`,
//! `{{ value }}`, `{{ classes.control }}`, `{% for e in errors %}` and so on.
//!
//! ```no_run
//! use std::sync::Arc;
//! use formwright::Renderer;
//! use formwright_tera::TeraAdapter;
//!
//! let renderer = Renderer::new().with_adapter("tera", Arc::new(TeraAdapter::new("templates")));
//! ```

use std::error::Error as _;
use std::fmt;
use std::path::{Path, PathBuf};

use formwright::{FieldContext, RenderError, TemplateAdapter};
use parking_lot::RwLock;
use tera::{Context, Tera};
use tracing::debug;

/// Renders field templates with Tera.
///
/// Template files are compiled on first use and kept for the adapter's
/// lifetime. Output is HTML-escaped.
pub struct TeraAdapter {
    root: PathBuf,
    extension: String,
    tera: RwLock<Tera>,
}

impl fmt::Debug for TeraAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeraAdapter")
            .field("root", &self.root)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

fn engine() -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![".tpl", ".html", ".htm", ".xml"]);
    tera
}

/// Flattens a Tera error and its causes into one message.
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl TeraAdapter {
    /// Creates an adapter reading templates below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "tpl".to_string(),
            tera: RwLock::new(engine()),
        }
    }

    /// Uses `extension` (without the dot) instead of `tpl`.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Template root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of compiled templates.
    pub fn loaded(&self) -> usize {
        self.tera.read().get_template_names().count()
    }

    /// Drops every compiled template so edits on disk are picked up.
    pub fn clear(&self) {
        *self.tera.write() = engine();
    }

    fn ensure_loaded(&self, template: &Path, key: &str) -> Result<(), RenderError> {
        if self.tera.read().get_template_names().any(|name| name == key) {
            return Ok(());
        }

        let mut tera = self.tera.write();
        // Another thread may have compiled it between the two locks.
        if tera.get_template_names().any(|name| name == key) {
            return Ok(());
        }
        tera.add_template_file(template, Some(key))
            .map_err(|e| RenderError::Engine(describe(&e)))?;
        debug!(template = key, "template compiled");
        Ok(())
    }
}

impl TemplateAdapter for TeraAdapter {
    fn render_template(&self, template: &Path, variables: &FieldContext) -> Result<String, RenderError> {
        // Keep the extension in the name so autoescaping applies.
        let key = template.to_string_lossy().into_owned();
        self.ensure_loaded(template, &key)?;

        let context = Context::from_serialize(variables).map_err(|e| RenderError::Engine(describe(&e)))?;
        self.tera
            .read()
            .render(&key, &context)
            .map_err(|e| RenderError::Engine(describe(&e)))
    }

    fn resolve_template_dir(&self, build_format: &str) -> PathBuf {
        self.root.join(build_format)
    }

    fn template_extension(&self) -> &str {
        &self.extension
    }
}
