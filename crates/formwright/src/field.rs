//! Field definitions.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::constraint::Constraint;

/// Input type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Email,
    Password,
    Textarea,
    Number,
    Select,
    Checkbox,
    Radio,
    Hidden,
    Submit,
    File,
    Date,
    Time,
    DateTime,
    /// A type registered with [`FormBuilder::register_type`](crate::FormBuilder::register_type).
    Custom(String),
}

impl FieldType {
    /// Parses a built-in type name. Returns `None` for anything else.
    pub fn builtin(name: &str) -> Option<Self> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "email" => Self::Email,
            "password" => Self::Password,
            "textarea" => Self::Textarea,
            "number" => Self::Number,
            "select" => Self::Select,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "hidden" => Self::Hidden,
            "submit" => Self::Submit,
            "file" => Self::File,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" | "datetime-local" => Self::DateTime,
            _ => return None,
        };
        Some(ty)
    }

    /// Stable name, also the default template name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Hidden => "hidden",
            Self::Submit => "submit",
            Self::File => "file",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Custom(name) => name,
        }
    }

    /// Value of the HTML `type` attribute for `<input>` based types.
    pub fn input_type(&self) -> &str {
        match self {
            Self::DateTime => "datetime-local",
            Self::Textarea | Self::Select => "text",
            other => other.as_str(),
        }
    }

    /// Select and radio fields cannot be committed without options.
    pub fn requires_options(&self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }

    /// Types that show a placeholder.
    pub fn accepts_placeholder(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Email | Self::Password | Self::Textarea | Self::Number
        )
    }

    /// Submit buttons carry no data.
    pub fn is_button(&self) -> bool {
        matches!(self, Self::Submit)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Definition of a form field.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Field name, unique within a form. May be dot-addressed.
    pub name: String,
    /// Input type.
    pub field_type: FieldType,
    /// Field label.
    pub label: String,
    /// HTML attributes in insertion order.
    pub attributes: IndexMap<String, String>,
    /// Choices (value -> label) for select and radio fields.
    pub options: IndexMap<String, String>,
    /// Constraints in attachment order.
    pub constraints: Vec<Constraint>,
    /// Help text.
    pub help_text: Option<String>,
    /// Whether the field is required.
    pub required: bool,
    /// Initial value used when no data is bound.
    pub initial: Option<Value>,
    /// Whether the field is disabled.
    pub disabled: bool,
}

impl FieldDefinition {
    /// Creates a new field definition.
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            label: label.into(),
            attributes: IndexMap::new(),
            options: IndexMap::new(),
            constraints: Vec::new(),
            help_text: None,
            required: false,
            initial: None,
            disabled: false,
        }
    }

    /// HTML id derived from the name (`address.city` -> `id_address_city`).
    pub fn html_id(&self) -> String {
        format!("id_{}", self.name.replace(['.', '[', ']'], "_"))
    }

    /// Gets an attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Turns a field name into a readable label: `first_name` -> `First Name`.
pub fn humanize(name: &str) -> String {
    name.split(['_', '.', '-'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
