//! Declarative form descriptions.
//!
//! A [`FormSchema`] is the serde form of a builder chain, so forms can live in
//! YAML or JSON files:
//!
//! ```yaml
//! name: contact
//! action: /contact
//! theme: bootstrap5
//! fields:
//!   - name: email
//!     type: email
//!     required: true
//! sections:
//!   - title: Message
//!     fields:
//!       - name: body
//!         type: textarea
//!         constraints:
//!           - kind: max_length
//!             value: 500
//! ```

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builder::{FieldBuilder, FormBuilder};
use crate::constraint::Constraint;
use crate::definition::HttpMethod;
use crate::error::{BuilderError, ConfigurationError};
use crate::field::{humanize, FieldType};
use crate::violation::FORM_PATH;

/// A whole form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSchema {
    pub name: String,
    pub action: Option<String>,
    pub method: Option<String>,
    pub renderer: Option<String>,
    pub theme: Option<String>,
    /// Fields placed before any section.
    pub fields: Vec<FieldSchema>,
    pub sections: Vec<SectionSchema>,
    /// Form-level constraints, usually named callbacks.
    pub constraints: Vec<ConstraintSchema>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionSchema {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FieldSchema>,
}

/// One field. `type` defaults to `text` and `label` to the title-cased name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub field_type: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    #[serde(default)]
    pub options: IndexMap<String, String>,
    #[serde(default)]
    pub initial: Option<Value>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub constraints: Vec<ConstraintSchema>,
}

fn default_type() -> String {
    "text".to_string()
}

/// One constraint.
///
/// `kind` is one of `required`, `min_length`, `max_length`, `min`, `max`,
/// `range`, `pattern`, `email` or `callback`. Callbacks are looked up by
/// `name` in the constraint engine when the form is validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintSchema {
    pub kind: String,
    pub value: Option<Value>,
    pub message: Option<String>,
    pub groups: Vec<String>,
    pub name: Option<String>,
}

impl ConstraintSchema {
    fn number(&self) -> Result<f64, ConfigurationError> {
        self.value
            .as_ref()
            .and_then(crate::data::as_number)
            .ok_or_else(|| ConfigurationError::invalid(&self.kind, "expected a number"))
    }

    fn length(&self) -> Result<usize, ConfigurationError> {
        self.value
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| ConfigurationError::invalid(&self.kind, "expected a non-negative integer"))
    }

    fn text(&self) -> Result<&str, ConfigurationError> {
        self.value
            .as_ref()
            .and_then(Value::as_str)
            .ok_or_else(|| ConfigurationError::invalid(&self.kind, "expected a string"))
    }

    /// Compiles the constraint. `field` names the owner in pattern errors.
    pub fn to_constraint(&self, field: &str) -> Result<Constraint, BuilderError> {
        let constraint = match self.kind.to_ascii_lowercase().as_str() {
            "required" => Constraint::required(),
            "min_length" | "minlength" => Constraint::min_length(self.length()?),
            "max_length" | "maxlength" => Constraint::max_length(self.length()?),
            "min" => Constraint::range(Some(self.number()?), None),
            "max" => Constraint::range(None, Some(self.number()?)),
            "range" => {
                let bound = |key: &str| {
                    self.value
                        .as_ref()
                        .and_then(|v| v.get(key))
                        .and_then(crate::data::as_number)
                };
                Constraint::range(bound("min"), bound("max"))
            }
            "pattern" => Constraint::pattern(self.text()?).map_err(|source| BuilderError::InvalidPattern {
                field: field.to_string(),
                source,
            })?,
            "email" => Constraint::email(),
            "callback" => {
                let name = match &self.name {
                    Some(name) => name.as_str(),
                    None => self.text()?,
                };
                Constraint::named(name)
            }
            _ => return Err(ConfigurationError::UnknownConstraint(self.kind.clone()).into()),
        };

        let constraint = match &self.message {
            Some(message) => constraint.with_message(message),
            None => constraint,
        };
        Ok(if self.groups.is_empty() {
            constraint
        } else {
            constraint.in_groups(self.groups.iter().cloned())
        })
    }
}

impl FieldSchema {
    fn apply(&self, builder: &mut FormBuilder) -> Result<(), BuilderError> {
        let field_type = FieldType::builtin(&self.field_type).unwrap_or_else(|| FieldType::Custom(self.field_type.clone()));
        let label = self.label.clone().unwrap_or_else(|| humanize(&self.name));

        let mut field: FieldBuilder<'_> = builder.add_field(&self.name, label, field_type);
        if self.required {
            field = field.required();
        }
        if let Some(placeholder) = &self.placeholder {
            field = field.placeholder(placeholder);
        }
        if let Some(help) = &self.help_text {
            field = field.help_text(help);
        }
        if let Some(class) = &self.class {
            field = field.add_class(class);
        }
        for (key, value) in &self.attributes {
            field = field.attr(key, value);
        }
        field = field.options(self.options.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(initial) = &self.initial {
            field = field.initial(initial.clone());
        }
        if self.disabled {
            field = field.disabled();
        }

        for schema in &self.constraints {
            let constraint = schema.to_constraint(&self.name)?;
            field = match (schema.kind.as_str(), &schema.value) {
                ("min_length" | "max_length" | "min" | "max" | "pattern", Some(value)) => {
                    let key = schema.kind.replace('_', "");
                    field.attr(key, crate::data::stringify(value))
                }
                _ => field,
            };
            field = field.constraint(constraint);
        }

        field.add()?;
        Ok(())
    }
}

impl FormSchema {
    /// Parses a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigurationError> {
        serde_yaml::from_str(text).map_err(|e| ConfigurationError::Schema(e.to_string()))
    }

    /// Parses a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(text).map_err(|e| ConfigurationError::Schema(e.to_string()))
    }

    /// Reads a `.json` file, or YAML for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigurationError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Schema(format!("{}: {e}", path.display())))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    /// Replays the schema on `builder`.
    ///
    /// Register custom types on the builder before applying.
    pub fn apply(&self, builder: &mut FormBuilder) -> Result<(), BuilderError> {
        if let Some(action) = &self.action {
            builder.set_action(action);
        }
        if let Some(method) = &self.method {
            builder.set_method(method.parse::<HttpMethod>()?);
        }
        if let Some(renderer) = &self.renderer {
            builder.set_renderer(renderer);
        }
        if let Some(theme) = &self.theme {
            builder.set_theme(theme);
        }

        for field in &self.fields {
            field.apply(builder)?;
        }
        for section in &self.sections {
            builder.add_section(&section.title, section.description.as_deref());
            for field in &section.fields {
                field.apply(builder)?;
            }
        }
        for schema in &self.constraints {
            builder.add_constraint(schema.to_constraint(FORM_PATH)?);
        }
        Ok(())
    }
}

impl FormBuilder {
    /// Creates a builder pre-populated from a schema.
    pub fn from_schema(schema: &FormSchema) -> Result<Self, BuilderError> {
        let mut builder = Self::create(&schema.name);
        schema.apply(&mut builder)?;
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintKind;

    const CONTACT: &str = r#"
name: contact
action: /contact
method: put
theme: bootstrap5
fields:
  - name: full_name
    required: true
    constraints:
      - kind: max_length
        value: 40
        message: "Keep it under {{ limit }}."
sections:
  - title: Message
    description: What can we do?
    fields:
      - name: topic
        type: select
        options:
          sales: Sales
          support: Support
      - name: age
        type: number
        constraints:
          - kind: min
            value: 18
constraints:
  - kind: callback
    name: not_spam
"#;

    #[test]
    fn test_yaml_schema_builds_definition() {
        let schema = FormSchema::from_yaml_str(CONTACT).unwrap();
        let definition = FormBuilder::from_schema(&schema).unwrap().build_definition().unwrap();

        assert_eq!(definition.name(), "contact");
        assert_eq!(definition.method(), HttpMethod::Put);
        assert_eq!(definition.theme(), "bootstrap5");
        assert_eq!(definition.sections().len(), 2);

        let name = definition.field("full_name").unwrap();
        assert_eq!(name.label, "Full Name");
        assert!(name.required);
        assert_eq!(name.attr("maxlength"), Some("40"));
        assert_eq!(name.constraints[1].message.as_deref(), Some("Keep it under {{ limit }}."));

        let topic = definition.field("topic").unwrap();
        assert_eq!(topic.field_type, FieldType::Select);
        assert_eq!(topic.options.get_index(1).map(|(k, _)| k.as_str()), Some("support"));
        assert_eq!(definition.field("age").unwrap().attr("min"), Some("18"));

        assert!(matches!(&definition.constraints()[0].kind, ConstraintKind::Named(n) if n == "not_spam"));
    }

    #[test]
    fn test_json_schema() {
        let schema = FormSchema::from_json_str(
            r#"{"name": "login", "fields": [{"name": "user"}, {"name": "pw", "type": "password"}]}"#,
        )
        .unwrap();
        let definition = FormBuilder::from_schema(&schema).unwrap().build_definition().unwrap();
        assert_eq!(definition.fields().count(), 2);
        assert_eq!(definition.field("pw").unwrap().field_type, FieldType::Password);
    }

    #[test]
    fn test_unknown_constraint_kind() {
        let schema = ConstraintSchema {
            kind: "luhn".into(),
            ..ConstraintSchema::default()
        };
        assert!(matches!(
            schema.to_constraint("card"),
            Err(BuilderError::Configuration(ConfigurationError::UnknownConstraint(k))) if k == "luhn"
        ));
    }

    #[test]
    fn test_bad_values_are_configuration_errors() {
        let schema = ConstraintSchema {
            kind: "max_length".into(),
            value: Some(Value::from("ten")),
            ..ConstraintSchema::default()
        };
        assert!(matches!(
            schema.to_constraint("f"),
            Err(BuilderError::Configuration(ConfigurationError::InvalidValue { .. }))
        ));
        assert!(FormSchema::from_yaml_str("name: [unclosed").is_err());
    }

    #[test]
    fn test_unknown_field_type() {
        let schema = FormSchema::from_yaml_str("name: f\nfields:\n  - name: c\n    type: color\n").unwrap();
        assert!(matches!(
            FormBuilder::from_schema(&schema),
            Err(BuilderError::Configuration(ConfigurationError::UnknownFieldType(_)))
        ));
    }
}
