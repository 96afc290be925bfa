//! Renderer dispatch.
//!
//! The [`Renderer`] turns a bound [`Form`] into HTML, JSON or XML. For HTML
//! each field is drawn either by the built-in widgets or by a registered
//! [`TemplateAdapter`], and the fragments are wrapped in a `<form>` element.

mod context;
mod html;
mod structured;

pub use context::{FieldClasses, FieldContext, OptionContext};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::definition::BUILTIN_RENDERER;
use crate::error::{ConfigurationError, FormError, RenderError};
use crate::field::{FieldDefinition, FieldType};
use crate::form::Form;
use crate::theme::{Theme, GENERIC_FORMAT};
use crate::translation::Catalog;
use crate::widgets;

/// A template engine the renderer delegates field rendering to.
pub trait TemplateAdapter: Send + Sync {
    /// Renders the template at `template` with the field's variables.
    fn render_template(&self, template: &Path, variables: &FieldContext) -> Result<String, RenderError>;

    /// Directory holding the templates of a build format.
    fn resolve_template_dir(&self, build_format: &str) -> PathBuf;

    /// File extension of template files, without the dot.
    fn template_extension(&self) -> &str {
        "tpl"
    }
}

/// Output of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
    Xml,
}

impl OutputFormat {
    /// MIME type of the rendered body.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// File extension for the rendered body.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" | "text/html" => Ok(Self::Html),
            "json" | "application/json" => Ok(Self::Json),
            "xml" | "application/xml" => Ok(Self::Xml),
            _ => Err(ConfigurationError::invalid("format", format!("unsupported output format {s}"))),
        }
    }
}

/// A field that could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderWarning {
    pub field: String,
    pub template: String,
    pub message: String,
}

/// Rendered body plus the warnings collected on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub body: String,
    pub format: OutputFormat,
    pub warnings: Vec<RenderWarning>,
}

impl RenderOutput {
    /// MIME type of the body.
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

type CacheKey = (String, String, String);

/// Renders forms through themes and template adapters.
///
/// Template lookups are cached for the renderer's lifetime, so build one
/// renderer at startup and share it.
pub struct Renderer {
    adapters: HashMap<String, Arc<dyn TemplateAdapter>>,
    themes: HashMap<String, Theme>,
    format: OutputFormat,
    catalog: Option<Arc<Catalog>>,
    /// (adapter, build format, template) -> resolved file.
    cache: RwLock<HashMap<CacheKey, Option<PathBuf>>>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .field("themes", &self.themes.keys().collect::<Vec<_>>())
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Creates an HTML renderer with the `Generic` and `bootstrap5` themes.
    pub fn new() -> Self {
        let mut themes = HashMap::new();
        for theme in [Theme::generic(), Theme::bootstrap5()] {
            themes.insert(theme.name.clone(), theme);
        }
        Self {
            adapters: HashMap::new(),
            themes,
            format: OutputFormat::Html,
            catalog: None,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a template adapter under `name`.
    #[must_use]
    pub fn with_adapter(mut self, name: impl Into<String>, adapter: Arc<dyn TemplateAdapter>) -> Self {
        self.adapters.insert(name.into(), adapter);
        self
    }

    /// Registers a theme under its name, replacing any theme of that name.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.themes.insert(theme.name.clone(), theme);
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Uses `catalog` for labels, placeholders and button captions. Without
    /// one, the catalog of the form's constraint engine is used.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Looks up a registered theme.
    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    /// Renders `form`.
    ///
    /// Error messages are shown only once the form has been validated.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the form names a theme or adapter
    /// that is not registered. Missing templates and adapter failures are
    /// not errors; they end up in [`RenderOutput::warnings`].
    pub fn render(&self, form: &Form) -> Result<RenderOutput, FormError> {
        let definition = form.definition();
        let theme = self
            .themes
            .get(definition.theme())
            .ok_or_else(|| ConfigurationError::UnknownTheme(definition.theme().to_string()))?;
        let catalog = self.catalog.as_deref().or_else(|| form.engine().catalog());
        let violations = form.cached_violations();

        let sections: Vec<Vec<FieldContext>> = definition
            .sections()
            .iter()
            .map(|section| {
                section
                    .fields
                    .iter()
                    .map(|field| {
                        let errors = violations
                            .map(|tree| tree.messages(&field.name).into_iter().map(str::to_string).collect())
                            .unwrap_or_default();
                        FieldContext::build(
                            field,
                            form.value(&field.name),
                            errors,
                            theme,
                            catalog,
                            section.title.as_deref(),
                        )
                    })
                    .collect()
            })
            .collect();

        let mut warnings = Vec::new();
        let body = match self.format {
            OutputFormat::Html => {
                let fragments = self.render_fields(form, theme, &sections, &mut warnings)?;
                let form_errors: Vec<&str> = violations.map(|t| t.form_messages()).unwrap_or_default();
                html::render_form(definition, theme, &form_errors, &fragments)
            }
            OutputFormat::Json => structured::to_json(definition, &sections, violations)?,
            OutputFormat::Xml => structured::to_xml(definition, &sections, violations)?,
        };

        debug!(
            form = %definition.name(),
            format = %self.format,
            theme = %theme.name,
            warnings = warnings.len(),
            "form rendered"
        );
        Ok(RenderOutput {
            body,
            format: self.format,
            warnings,
        })
    }

    fn render_fields(
        &self,
        form: &Form,
        theme: &Theme,
        sections: &[Vec<FieldContext>],
        warnings: &mut Vec<RenderWarning>,
    ) -> Result<Vec<Vec<String>>, ConfigurationError> {
        let definition = form.definition();
        let renderer = definition.renderer();

        if renderer == BUILTIN_RENDERER {
            let fragments = definition
                .sections()
                .iter()
                .zip(sections)
                .map(|(section, contexts)| {
                    section
                        .fields
                        .iter()
                        .zip(contexts)
                        .map(|(field, ctx)| {
                            let widget = match &field.field_type {
                                FieldType::Custom(name) => definition.widget(name),
                                builtin => widgets::builtin(builtin),
                            };
                            match widget {
                                Some(widget) => widgets::render_field(widget, ctx),
                                None => {
                                    record(warnings, field, field.field_type.as_str(), "no widget registered");
                                    String::new()
                                }
                            }
                        })
                        .collect()
                })
                .collect();
            return Ok(fragments);
        }

        let adapter = self
            .adapters
            .get(renderer)
            .ok_or_else(|| ConfigurationError::UnknownAdapter(renderer.to_string()))?;

        let fragments = definition
            .sections()
            .iter()
            .zip(sections)
            .map(|(section, contexts)| {
                section
                    .fields
                    .iter()
                    .zip(contexts)
                    .map(|(field, ctx)| {
                        let template = theme.template_for(&field.field_type);
                        let Some(path) = self.resolve_template(renderer, adapter.as_ref(), &theme.name, &template)
                        else {
                            record(warnings, field, &template, "template not found");
                            return String::new();
                        };
                        adapter.render_template(&path, ctx).unwrap_or_else(|e| {
                            record(warnings, field, &template, &e.to_string());
                            String::new()
                        })
                    })
                    .collect()
            })
            .collect();
        Ok(fragments)
    }

    /// Finds `<template>.<ext>` in the build format's directory, then in the
    /// `Generic` one.
    fn resolve_template(
        &self,
        adapter_name: &str,
        adapter: &dyn TemplateAdapter,
        build_format: &str,
        template: &str,
    ) -> Option<PathBuf> {
        let key = (adapter_name.to_string(), build_format.to_string(), template.to_string());
        if let Some(cached) = self.cache.read().get(&key) {
            trace!(template, build_format, "template cache hit");
            return cached.clone();
        }

        let file = format!("{template}.{}", adapter.template_extension());
        let resolved = [build_format, GENERIC_FORMAT]
            .into_iter()
            .map(|format| adapter.resolve_template_dir(format).join(&file))
            .find(|path| path.is_file());
        debug!(template, build_format, resolved = ?resolved, "template resolved");

        self.cache.write().entry(key).or_insert(resolved).clone()
    }
}

fn record(warnings: &mut Vec<RenderWarning>, field: &FieldDefinition, template: &str, message: &str) {
    warn!(field = %field.name, template, message, "field rendered empty");
    warnings.push(RenderWarning {
        field: field.name.clone(),
        template: template.to_string(),
        message: message.to_string(),
    });
}
