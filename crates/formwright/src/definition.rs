//! Immutable form blueprints.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::constraint::Constraint;
use crate::error::ConfigurationError;
use crate::field::{FieldDefinition, FieldType};
use crate::widgets::Widget;

/// Renderer that needs no template adapter.
pub const BUILTIN_RENDERER: &str = "builtin";

/// HTTP method a form submits with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Upper-case verb.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Browsers only submit GET and POST; other verbs are tunnelled.
    pub fn is_native(self) -> bool {
        matches!(self, Self::Get | Self::Post)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(ConfigurationError::invalid("method", format!("unsupported verb {s}"))),
        }
    }
}

/// A group of fields with an optional header.
#[derive(Debug, Clone, Default)]
pub struct Section {
    /// Header; `None` for the implicit default section.
    pub title: Option<String>,
    /// Text shown under the header.
    pub description: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDefinition>,
}

impl Section {
    /// Creates a titled section.
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: Some(title.into()),
            description,
            fields: Vec::new(),
        }
    }
}

/// The finalized output of a [`FormBuilder`](crate::FormBuilder).
///
/// Never mutated after the builder returns it; share it behind an [`Arc`]
/// and bind it to as many [`Form`](crate::Form) instances as needed.
pub struct FormDefinition {
    pub(crate) name: String,
    pub(crate) sections: Vec<Section>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) action: String,
    pub(crate) method: HttpMethod,
    pub(crate) renderer: String,
    pub(crate) theme: String,
    pub(crate) widgets: HashMap<String, Arc<dyn Widget>>,
}

impl fmt::Debug for FormDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormDefinition")
            .field("name", &self.name)
            .field("sections", &self.sections)
            .field("constraints", &self.constraints)
            .field("action", &self.action)
            .field("method", &self.method)
            .field("renderer", &self.renderer)
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

impl FormDefinition {
    /// Form name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sections in declaration order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All fields across sections, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields().find(|f| f.name == name)
    }

    /// Form-level (cross-field) constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Action URL.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Name of the renderer (template adapter) to use.
    pub fn renderer(&self) -> &str {
        &self.renderer
    }

    /// Name of the theme, which is also the build format.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Whether any field uploads a file, requiring multipart encoding.
    pub fn has_file_field(&self) -> bool {
        self.fields().any(|f| f.field_type == FieldType::File)
    }

    /// Widget registered for a custom type.
    pub fn widget(&self, type_name: &str) -> Option<&dyn Widget> {
        self.widgets.get(type_name).map(|w| &**w)
    }
}
