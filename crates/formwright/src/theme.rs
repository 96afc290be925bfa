//! Themes: template selection and CSS conventions per build format.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::field::FieldType;

/// Build format used when a theme-specific template is missing.
pub const GENERIC_FORMAT: &str = "Generic";

/// Maps field types to templates and CSS classes.
///
/// The theme name doubles as the build format, i.e. the template
/// directory searched first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub name: String,
    pub form_class: String,
    pub section_class: String,
    pub wrapper_class: String,
    pub label_class: String,
    pub input_class: String,
    pub select_class: String,
    pub check_wrapper_class: String,
    pub check_input_class: String,
    pub check_label_class: String,
    pub error_class: String,
    pub invalid_class: String,
    pub help_class: String,
    pub submit_class: String,
    pub alert_class: String,
    /// Template overrides keyed by field type name.
    pub templates: HashMap<String, String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::generic()
    }
}

impl Theme {
    /// Plain markup with semantic class names.
    pub fn generic() -> Self {
        Self {
            name: GENERIC_FORMAT.to_string(),
            form_class: String::new(),
            section_class: "form-section".to_string(),
            wrapper_class: "form-field".to_string(),
            label_class: String::new(),
            input_class: String::new(),
            select_class: String::new(),
            check_wrapper_class: "form-field form-check".to_string(),
            check_input_class: String::new(),
            check_label_class: String::new(),
            error_class: "form-error".to_string(),
            invalid_class: "invalid".to_string(),
            help_class: "form-help".to_string(),
            submit_class: String::new(),
            alert_class: "form-errors".to_string(),
            templates: HashMap::new(),
        }
    }

    /// Bootstrap 5 classes.
    pub fn bootstrap5() -> Self {
        Self {
            name: "bootstrap5".to_string(),
            form_class: String::new(),
            section_class: "mb-4".to_string(),
            wrapper_class: "mb-3".to_string(),
            label_class: "form-label".to_string(),
            input_class: "form-control".to_string(),
            select_class: "form-select".to_string(),
            check_wrapper_class: "form-check mb-3".to_string(),
            check_input_class: "form-check-input".to_string(),
            check_label_class: "form-check-label".to_string(),
            error_class: "invalid-feedback".to_string(),
            invalid_class: "is-invalid".to_string(),
            help_class: "form-text".to_string(),
            submit_class: "btn btn-primary".to_string(),
            alert_class: "alert alert-danger".to_string(),
            templates: HashMap::new(),
        }
    }

    /// Loads a theme from a YAML or JSON file. Missing keys take the
    /// generic defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigurationError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigurationError::invalid("theme", format!("{}: {e}", path.display())))?;
        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&text).map_err(|e| e.to_string()),
            _ => serde_yaml::from_str(&text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigurationError::invalid("theme", message))
    }

    /// Overrides the template used for a field type.
    #[must_use]
    pub fn with_template(mut self, field_type: &str, template: impl Into<String>) -> Self {
        self.templates.insert(field_type.to_string(), template.into());
        self
    }

    /// Template name for a field type.
    pub fn template_for(&self, field_type: &FieldType) -> String {
        self.templates
            .get(field_type.as_str())
            .cloned()
            .unwrap_or_else(|| field_type.as_str().to_string())
    }

    /// Class of the control element.
    pub fn control_class(&self, field_type: &FieldType) -> &str {
        match field_type {
            FieldType::Select => &self.select_class,
            FieldType::Checkbox | FieldType::Radio => &self.check_input_class,
            FieldType::Submit => &self.submit_class,
            FieldType::Hidden => "",
            _ => &self.input_class,
        }
    }

    /// Class of the element wrapping label, control and messages.
    pub fn wrapper_class_for(&self, field_type: &FieldType) -> &str {
        match field_type {
            FieldType::Checkbox => &self.check_wrapper_class,
            _ => &self.wrapper_class,
        }
    }

    /// Class of the label element.
    pub fn label_class_for(&self, field_type: &FieldType) -> &str {
        match field_type {
            FieldType::Checkbox => &self.check_label_class,
            _ => &self.label_class,
        }
    }
}
