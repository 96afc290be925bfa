//! Fluent form builder.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::constraint::{Constraint, ConstraintKind};
use crate::data::FormData;
use crate::definition::{FormDefinition, HttpMethod, Section, BUILTIN_RENDERER};
use crate::engine::ConstraintEngine;
use crate::error::{BuilderError, ConfigurationError};
use crate::field::{FieldDefinition, FieldType};
use crate::form::Form;
use crate::theme::GENERIC_FORMAT;
use crate::violation::ExecutionContext;
use crate::widgets::Widget;

/// Accumulates sections, fields and form-level constraints.
///
/// Each `add_*` method opens a [`FieldBuilder`]; its `add()` commits the
/// field and hands the form builder back:
///
/// ```
/// use formwright::FormBuilder;
///
/// let mut builder = FormBuilder::create("signup");
/// builder
///     .add_text("name", "Name").required().max_length(50).add()?
///     .add_email("email", "Email").required().add()?
///     .add_section("Security", None)
///     .add_password("password", "Password").min_length(8).add()?;
/// let form = builder.build_form()?;
/// assert_eq!(form.definition().fields().count(), 3);
/// # Ok::<(), formwright::BuilderError>(())
/// ```
pub struct FormBuilder {
    name: String,
    sections: Vec<Section>,
    constraints: Vec<Constraint>,
    action: String,
    method: HttpMethod,
    renderer: String,
    theme: String,
    widgets: HashMap<String, Arc<dyn Widget>>,
    engine: Arc<ConstraintEngine>,
    /// Fields opened but not yet committed.
    pending: Vec<String>,
}

impl fmt::Debug for FormBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBuilder")
            .field("name", &self.name)
            .field("sections", &self.sections)
            .field("constraints", &self.constraints)
            .field("renderer", &self.renderer)
            .field("theme", &self.theme)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl FormBuilder {
    /// Starts a form named `name`, rendered by the built-in renderer with the
    /// `Generic` theme and submitted with POST to an empty action.
    pub fn create(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: vec![Section::default()],
            constraints: Vec::new(),
            action: String::new(),
            method: HttpMethod::default(),
            renderer: BUILTIN_RENDERER.to_string(),
            theme: GENERIC_FORMAT.to_string(),
            widgets: HashMap::new(),
            engine: Arc::new(ConstraintEngine::new()),
            pending: Vec::new(),
        }
    }

    /// Opens a field of any type.
    ///
    /// Custom types must be registered with [`register_type`](Self::register_type)
    /// first, otherwise `add()` fails.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        label: impl Into<String>,
        field_type: FieldType,
    ) -> FieldBuilder<'_> {
        let name = name.into();
        let error: Option<BuilderError> = match &field_type {
            FieldType::Custom(type_name) if !self.widgets.contains_key(type_name) => {
                Some(ConfigurationError::UnknownFieldType(type_name.clone()).into())
            }
            _ => None,
        };
        self.pending.push(name.clone());
        FieldBuilder {
            field: FieldDefinition::new(name, label, field_type),
            builder: self,
            groups: None,
            error,
        }
    }

    /// Opens a text field.
    pub fn add_text(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Text)
    }

    /// Opens an email field. It gets an email format check on commit.
    pub fn add_email(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Email)
    }

    /// Opens a password field.
    pub fn add_password(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Password)
    }

    /// Opens a number field. Non-numeric input is reported as a type violation.
    pub fn add_number(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Number)
    }

    /// Opens a select field; it needs options before `add()`.
    pub fn add_select(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Select)
    }

    /// Opens a radio group; it needs options before `add()`.
    pub fn add_radio(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Radio)
    }

    /// Opens a checkbox.
    pub fn add_checkbox(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Checkbox)
    }

    /// Opens a textarea.
    pub fn add_textarea(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Textarea)
    }

    /// Opens a hidden field.
    pub fn add_hidden(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Hidden)
    }

    /// Opens a submit button.
    pub fn add_submit(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Submit)
    }

    /// Opens a file upload. The form switches to multipart encoding.
    pub fn add_file(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::File)
    }

    /// Opens a date input.
    pub fn add_date(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Date)
    }

    /// Opens a time input.
    pub fn add_time(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::Time)
    }

    /// Opens a local date and time input.
    pub fn add_datetime(&mut self, name: impl Into<String>, label: impl Into<String>) -> FieldBuilder<'_> {
        self.add_field(name, label, FieldType::DateTime)
    }

    /// Starts a new section; later fields attach to it.
    pub fn add_section(&mut self, title: impl Into<String>, description: Option<&str>) -> &mut Self {
        self.sections
            .push(Section::new(title, description.map(str::to_string)));
        self
    }

    /// Attaches a form-level (cross-field) constraint. Only callbacks make
    /// sense here; other kinds fail at build time.
    pub fn add_constraint(&mut self, constraint: Constraint) -> &mut Self {
        self.constraints.push(constraint);
        self
    }

    /// Registers a custom field type and the widget drawing it.
    pub fn register_type(&mut self, name: impl Into<String>, widget: impl Widget + 'static) -> &mut Self {
        self.widgets.insert(name.into(), Arc::new(widget));
        self
    }

    /// Names the template adapter used for rendering.
    pub fn set_renderer(&mut self, renderer: impl Into<String>) -> &mut Self {
        self.renderer = renderer.into();
        self
    }

    /// Names the theme, which is also the template build format.
    pub fn set_theme(&mut self, theme: impl Into<String>) -> &mut Self {
        self.theme = theme.into();
        self
    }

    /// URL the form submits to.
    pub fn set_action(&mut self, action: impl Into<String>) -> &mut Self {
        self.action = action.into();
        self
    }

    /// HTTP method; non-native methods are tunnelled through `_method`.
    pub fn set_method(&mut self, method: HttpMethod) -> &mut Self {
        self.method = method;
        self
    }

    /// Uses `engine` to validate forms built here.
    pub fn set_engine(&mut self, engine: Arc<ConstraintEngine>) -> &mut Self {
        self.engine = engine;
        self
    }

    /// Whether a field named `name` has been committed.
    pub fn has_field(&self, name: &str) -> bool {
        self.sections
            .iter()
            .flat_map(|s| s.fields.iter())
            .any(|f| f.name == name)
    }

    /// Finalizes the definition for sharing across many forms.
    ///
    /// # Errors
    ///
    /// [`BuilderError::UncommittedField`] when a field builder was dropped
    /// without `add()`, [`BuilderError::DuplicateField`] when two fields share
    /// a name, [`ConfigurationError::FormLevelConstraint`] when a form-level
    /// constraint is not a callback.
    pub fn build_definition(self) -> Result<Arc<FormDefinition>, BuilderError> {
        if let Some(name) = self.pending.first() {
            return Err(BuilderError::UncommittedField(name.clone()));
        }

        if let Some(constraint) = self.constraints.iter().find(|c| !c.kind.is_callback()) {
            return Err(ConfigurationError::FormLevelConstraint(constraint.kind.name().to_string()).into());
        }

        let mut seen = HashSet::new();
        for field in self.sections.iter().flat_map(|s| s.fields.iter()) {
            if !seen.insert(field.name.as_str()) {
                return Err(BuilderError::DuplicateField(field.name.clone()));
            }
        }
        let field_count = seen.len();

        let sections: Vec<Section> = self
            .sections
            .into_iter()
            .filter(|s| s.title.is_some() || !s.fields.is_empty())
            .collect();

        debug!(
            form = %self.name,
            sections = sections.len(),
            fields = field_count,
            "form definition built"
        );
        Ok(Arc::new(FormDefinition {
            name: self.name,
            sections,
            constraints: self.constraints,
            action: self.action,
            method: self.method,
            renderer: self.renderer,
            theme: self.theme,
            widgets: self.widgets,
        }))
    }

    /// Finalizes the definition and returns an unbound form in add mode.
    pub fn build_form(self) -> Result<Form, BuilderError> {
        let engine = Arc::clone(&self.engine);
        Ok(Form::new(self.build_definition()?).with_engine(engine))
    }
}

/// Configures one field until [`add`](FieldBuilder::add) commits it.
#[must_use = "a field is only part of the form after add()"]
#[derive(Debug)]
pub struct FieldBuilder<'a> {
    builder: &'a mut FormBuilder,
    field: FieldDefinition,
    groups: Option<Vec<String>>,
    error: Option<BuilderError>,
}

impl<'a> FieldBuilder<'a> {
    fn push(&mut self, mut constraint: Constraint) {
        if let Some(groups) = &self.groups {
            constraint.groups.clone_from(groups);
        }
        self.field.constraints.push(constraint);
    }

    fn fail(&mut self, error: BuilderError) {
        self.error.get_or_insert(error);
    }

    /// Requires a non-blank value.
    pub fn required(mut self) -> Self {
        self.field.required = true;
        self.push(Constraint::required());
        self
    }

    /// Limits the value to `n` characters.
    pub fn max_length(mut self, n: usize) -> Self {
        self.field.attributes.insert("maxlength".into(), n.to_string());
        self.push(Constraint::max_length(n));
        self
    }

    /// Requires at least `n` characters.
    pub fn min_length(mut self, n: usize) -> Self {
        self.field.attributes.insert("minlength".into(), n.to_string());
        self.push(Constraint::min_length(n));
        self
    }

    /// Requires the value to match `pattern`. An invalid expression makes
    /// `add()` fail.
    pub fn pattern(mut self, pattern: &str) -> Self {
        match Constraint::pattern(pattern) {
            Ok(constraint) => {
                self.field.attributes.insert("pattern".into(), pattern.to_string());
                self.push(constraint);
            }
            Err(source) => {
                let field = self.field.name.clone();
                self.fail(BuilderError::InvalidPattern { field, source });
            }
        }
        self
    }

    /// Lower numeric bound.
    pub fn min(mut self, n: f64) -> Self {
        self.field.attributes.insert("min".into(), n.to_string());
        self.set_bound(Some(n), None);
        self
    }

    /// Upper numeric bound.
    pub fn max(mut self, n: f64) -> Self {
        self.field.attributes.insert("max".into(), n.to_string());
        self.set_bound(None, Some(n));
        self
    }

    fn set_bound(&mut self, lower: Option<f64>, upper: Option<f64>) {
        let existing = self.field.constraints.iter_mut().find(|c| c.is_range());
        if let Some(Constraint {
            kind: ConstraintKind::Range { min, max },
            ..
        }) = existing
        {
            if lower.is_some() {
                *min = lower;
            }
            if upper.is_some() {
                *max = upper;
            }
            return;
        }
        self.push(Constraint::range(lower, upper));
    }

    /// Validates the value as an email address.
    pub fn email(mut self) -> Self {
        self.push(Constraint::email());
        self
    }

    /// Attaches a callback. It sees the whole data set and reports through
    /// the context, usually with `add_field_violation`.
    pub fn callback<F>(mut self, f: F) -> Self
    where
        F: Fn(&FormData, &mut ExecutionContext) + Send + Sync + 'static,
    {
        self.push(Constraint::callback(f));
        self
    }

    /// Attaches any constraint. A required constraint also marks the field
    /// required.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        if matches!(constraint.kind, ConstraintKind::Required) {
            self.field.required = true;
        }
        self.push(constraint);
        self
    }

    /// Overrides the message of the most recently attached constraint.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.field.constraints.last_mut() {
            last.message = Some(message.into());
        }
        self
    }

    /// Puts the constraints attached after this call into `groups`.
    pub fn in_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    /// Placeholder text; defaults to the title-cased name when rendered.
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.field.attributes.insert("placeholder".into(), text.into());
        self
    }

    /// Help text shown under the control.
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.field.help_text = Some(text.into());
        self
    }

    /// Appends a CSS class to the control.
    pub fn add_class(mut self, class: &str) -> Self {
        let classes = self.field.attributes.entry("class".into()).or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self
    }

    /// Sets an HTML attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.field.attributes.insert(key.into(), value.into());
        self
    }

    /// Adds choices as `(value, label)` pairs, keeping their order.
    pub fn options<I, K, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.field
            .options
            .extend(options.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Value shown while no data is bound.
    pub fn initial(mut self, value: impl Into<Value>) -> Self {
        self.field.initial = Some(value.into());
        self
    }

    /// Renders the control disabled.
    pub fn disabled(mut self) -> Self {
        self.field.disabled = true;
        self
    }

    /// Commits the field to the current section and returns the form builder.
    ///
    /// # Errors
    ///
    /// Fails when a modifier recorded an error, when a select or radio field
    /// has no options, or when the name is already taken. The field then
    /// stays uncommitted.
    pub fn add(self) -> Result<&'a mut FormBuilder, BuilderError> {
        let FieldBuilder {
            builder,
            mut field,
            groups,
            error,
        } = self;

        if let Some(error) = error {
            return Err(error);
        }
        if field.field_type.requires_options() && field.options.is_empty() {
            return Err(BuilderError::MissingOptions(field.name));
        }
        if builder.has_field(&field.name) {
            return Err(BuilderError::DuplicateField(field.name));
        }

        let with_groups = |mut c: Constraint| {
            if let Some(groups) = &groups {
                c.groups.clone_from(groups);
            }
            c
        };
        if field.field_type == FieldType::Email
            && !field.constraints.iter().any(|c| matches!(c.kind, ConstraintKind::Email))
        {
            field.constraints.push(with_groups(Constraint::email()));
        }
        if field.field_type == FieldType::Number && !field.constraints.iter().any(Constraint::is_range) {
            field.constraints.push(with_groups(Constraint::range(None, None)));
        }

        if let Some(pos) = builder.pending.iter().position(|n| *n == field.name) {
            builder.pending.remove(pos);
        }
        // The implicit default section always exists until build.
        if let Some(section) = builder.sections.last_mut() {
            section.fields.push(field);
        }
        Ok(builder)
    }
}
