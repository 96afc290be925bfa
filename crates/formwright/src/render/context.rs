//! Per-field render variables.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::data;
use crate::field::{humanize, FieldDefinition, FieldType};
use crate::theme::Theme;
use crate::translation::Catalog;

/// Everything a template or widget needs to draw one field.
///
/// Serialized as-is into the template engine's variable scope.
#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: String,
    /// Value of the HTML `type` attribute.
    pub input_type: String,
    pub label: String,
    /// Current value as text, `None` when nothing is bound.
    pub value: Option<String>,
    /// Selected values for fields bound to a list.
    pub values: Vec<String>,
    pub placeholder: Option<String>,
    /// User attributes, without `class` and `placeholder`.
    pub attributes: IndexMap<String, String>,
    pub options: Vec<OptionContext>,
    pub errors: Vec<String>,
    pub help_text: Option<String>,
    pub required: bool,
    pub disabled: bool,
    /// Checkbox state.
    pub checked: bool,
    pub classes: FieldClasses,
    /// Title of the enclosing section.
    pub section: Option<String>,
}

/// One choice of a select or radio field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionContext {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// CSS classes resolved from the theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldClasses {
    pub wrapper: String,
    pub label: String,
    pub control: String,
    pub error: String,
    pub help: String,
}

impl FieldContext {
    /// Builds the context of `field` bound to `value`.
    pub fn build(
        field: &FieldDefinition,
        value: Option<&Value>,
        errors: Vec<String>,
        theme: &Theme,
        catalog: Option<&Catalog>,
        section: Option<&str>,
    ) -> Self {
        // Secrets and uploads are never echoed back, in any output format.
        let echoes = !matches!(field.field_type, FieldType::Password | FieldType::File);
        let value = value
            .or(field.initial.as_ref())
            .filter(|v| echoes && !v.is_null());
        let values: Vec<String> = match value {
            Some(Value::Array(items)) => items.iter().map(data::stringify).collect(),
            Some(other) => vec![data::stringify(other)],
            None => Vec::new(),
        };
        let text = value.map(data::stringify);

        let label = if field.field_type.is_button() {
            catalog.map_or(field.label.as_str(), |c| c.button(&field.name, &field.label))
        } else {
            catalog.map_or(field.label.as_str(), |c| c.label(&field.name, &field.label))
        };

        let placeholder = field.field_type.accepts_placeholder().then(|| {
            field
                .attr("placeholder")
                .filter(|p| !p.is_empty())
                .or_else(|| catalog.and_then(|c| c.placeholder(&field.name)))
                .map_or_else(|| humanize(&field.name), str::to_string)
        });

        let mut control = theme.control_class(&field.field_type).to_string();
        if let Some(extra) = field.attr("class") {
            control = format!("{control} {extra}");
        }
        if !errors.is_empty() && !theme.invalid_class.is_empty() {
            control = format!("{control} {}", theme.invalid_class);
        }

        let options = field
            .options
            .iter()
            .map(|(value, label)| OptionContext {
                value: value.clone(),
                label: label.clone(),
                selected: values.contains(value),
            })
            .collect();

        let checked = field.field_type == FieldType::Checkbox
            && value.is_some_and(|v| match v {
                Value::Bool(b) => *b,
                other => matches!(data::stringify(other).as_str(), "true" | "on" | "1" | "yes"),
            });

        Self {
            name: field.name.clone(),
            id: field.html_id(),
            field_type: field.field_type.as_str().to_string(),
            input_type: field.field_type.input_type().to_string(),
            label: label.to_string(),
            value: text,
            values,
            placeholder,
            attributes: field
                .attributes
                .iter()
                .filter(|(k, _)| k.as_str() != "class" && k.as_str() != "placeholder")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            options,
            errors,
            help_text: field.help_text.clone(),
            required: field.required,
            disabled: field.disabled,
            checked,
            classes: FieldClasses {
                wrapper: theme.wrapper_class_for(&field.field_type).to_string(),
                label: theme.label_class_for(&field.field_type).to_string(),
                control: control.trim().to_string(),
                error: theme.error_class.clone(),
                help: theme.help_class.clone(),
            },
            section: section.map(str::to_string),
        }
    }
}
