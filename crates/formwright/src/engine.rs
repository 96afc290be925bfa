//! Constraint evaluation.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::constraint::{
    default_message, interpolate, Callback, Constraint, ConstraintKind, ViolationKind,
};
use crate::data::{self, FormData};
use crate::definition::FormDefinition;
use crate::error::ConfigurationError;
use crate::field::{FieldDefinition, FieldType};
use crate::translation::Catalog;
use crate::violation::{ExecutionContext, Violation, ViolationTree};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid")
});

/// Evaluates constraints against bound data.
///
/// Holds the named callbacks declarative schemas refer to and an optional
/// catalog for `form.error.*` and `form.label.*` messages. Evaluation has no
/// side effects, so one engine can serve any number of forms and threads.
#[derive(Debug, Clone, Default)]
pub struct ConstraintEngine {
    callbacks: HashMap<String, Callback>,
    catalog: Option<Arc<Catalog>>,
}

/// A failure found while checking one constraint, before message lookup.
struct Failure {
    kind: ViolationKind,
    message_key: &'static str,
    params: Vec<(&'static str, String)>,
}

impl Failure {
    fn new(kind: ViolationKind) -> Self {
        Self {
            kind,
            message_key: kind.as_str(),
            params: Vec::new(),
        }
    }

    fn keyed(kind: ViolationKind, message_key: &'static str) -> Self {
        Self {
            kind,
            message_key,
            params: Vec::new(),
        }
    }

    fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }
}

impl ConstraintEngine {
    /// Creates an engine without callbacks or translations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `catalog` for error messages and labels.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Registers a callback that [`Constraint::named`] can refer to.
    #[must_use]
    pub fn register<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FormData, &mut ExecutionContext) + Send + Sync + 'static,
    {
        self.callbacks.insert(name.into(), Callback::new(f));
        self
    }

    /// Returns whether a named callback is registered.
    pub fn has_callback(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// The catalog used for messages, if any.
    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_deref()
    }

    /// Validates `data` against every field and form-level constraint whose
    /// groups intersect `groups`.
    ///
    /// Fields are visited in declaration order and constraints in attachment
    /// order; form-level constraints run last. Every applicable constraint
    /// runs, even after an earlier one on the same field failed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownConstraint`] when a named
    /// callback is not registered, and
    /// [`ConfigurationError::FormLevelConstraint`] when a value constraint
    /// is attached to the form itself.
    pub fn evaluate(
        &self,
        definition: &FormDefinition,
        data: &FormData,
        groups: &[String],
    ) -> Result<ViolationTree, ConfigurationError> {
        let mut tree = ViolationTree::new();

        for field in definition.fields() {
            let value = data::lookup(data, &field.name);
            let active: Vec<&Constraint> = field.constraints.iter().filter(|c| c.applies_to(groups)).collect();
            let required = active.iter().any(|c| matches!(c.kind, ConstraintKind::Required));
            for constraint in active {
                self.check_field(field, value, constraint, required, data, &mut tree)?;
            }
        }

        for constraint in definition.constraints().iter().filter(|c| c.applies_to(groups)) {
            let Some(callback) = self.resolve_callback(constraint)? else {
                return Err(ConfigurationError::FormLevelConstraint(constraint.kind.name().to_string()));
            };
            let mut ctx = ExecutionContext::new(None);
            callback.call(data, &mut ctx);
            for violation in ctx.into_violations() {
                tree.add(violation);
            }
        }

        debug!(
            form = %definition.name(),
            groups = ?groups,
            paths = tree.len(),
            violations = tree.violation_count(),
            "validation pass finished"
        );
        Ok(tree)
    }

    fn resolve_callback<'a>(
        &'a self,
        constraint: &'a Constraint,
    ) -> Result<Option<&'a Callback>, ConfigurationError> {
        match &constraint.kind {
            ConstraintKind::Callback(callback) => Ok(Some(callback)),
            ConstraintKind::Named(name) => self
                .callbacks
                .get(name)
                .map(Some)
                .ok_or_else(|| ConfigurationError::UnknownConstraint(name.clone())),
            _ => Ok(None),
        }
    }

    fn check_field(
        &self,
        field: &FieldDefinition,
        value: Option<&Value>,
        constraint: &Constraint,
        required: bool,
        data: &FormData,
        tree: &mut ViolationTree,
    ) -> Result<(), ConfigurationError> {
        if let Some(callback) = self.resolve_callback(constraint)? {
            let mut ctx = ExecutionContext::new(Some(&field.name));
            callback.call(data, &mut ctx);
            for violation in ctx.into_violations() {
                tree.add(violation);
            }
            return Ok(());
        }

        let presence = Presence {
            required,
            checkbox: field.field_type == FieldType::Checkbox,
        };
        if let Some(failure) = check_value(&constraint.kind, value, presence) {
            let message = self.message(field, value, constraint, &failure);
            tree.add(Violation::new(&field.name, message, failure.kind));
        }
        Ok(())
    }

    fn message(
        &self,
        field: &FieldDefinition,
        value: Option<&Value>,
        constraint: &Constraint,
        failure: &Failure,
    ) -> String {
        let template = constraint
            .message
            .as_deref()
            .or_else(|| self.catalog().and_then(|c| c.error(failure.message_key)))
            .unwrap_or_else(|| default_message(failure.message_key));

        let label = self
            .catalog()
            .map_or(field.label.as_str(), |c| c.label(&field.name, &field.label));

        let mut params = failure.params.clone();
        params.push(("value", value.map(data::stringify).unwrap_or_default()));
        params.push(("label", label.to_string()));
        params.push(("field", field.name.clone()));
        interpolate(template, &params)
    }
}

/// What the engine knows about the field besides its value.
#[derive(Debug, Clone, Copy, Default)]
struct Presence {
    /// A `required` constraint is active on the field.
    required: bool,
    /// `false` counts as blank.
    checkbox: bool,
}

/// Runs the predicate of a value constraint. Callbacks are handled by the
/// caller and never fail here.
///
/// Empty values skip `min_length`, range and format checks unless the field
/// is required, in which case format checks run against `""`. `max_length`
/// always runs.
fn check_value(kind: &ConstraintKind, value: Option<&Value>, presence: Presence) -> Option<Failure> {
    let empty = data::is_empty(value);
    let text = || value.map(data::stringify).unwrap_or_default();
    match kind {
        ConstraintKind::Required => {
            let blank = data::is_blank(value) || (presence.checkbox && value == Some(&Value::Bool(false)));
            blank.then(|| Failure::new(ViolationKind::Required))
        }
        ConstraintKind::MaxLength(limit) => {
            let length = text().chars().count();
            (length > *limit).then(|| Failure::new(ViolationKind::MaxLength).param("limit", limit))
        }
        ConstraintKind::MinLength(_) | ConstraintKind::Range { .. } if empty => None,
        ConstraintKind::Pattern(_) | ConstraintKind::Email if empty && !presence.required => None,
        ConstraintKind::MinLength(limit) => {
            let length = text().chars().count();
            (length < *limit).then(|| Failure::new(ViolationKind::MinLength).param("limit", limit))
        }
        ConstraintKind::Range { min, max } => check_range(*min, *max, value?),
        ConstraintKind::Pattern(regex) => (!regex.is_match(&text())).then(|| {
            Failure::new(ViolationKind::Pattern).param("pattern", regex.as_str())
        }),
        ConstraintKind::Email => {
            (!EMAIL_REGEX.is_match(text().trim())).then(|| Failure::new(ViolationKind::Email))
        }
        ConstraintKind::Callback(_) | ConstraintKind::Named(_) => None,
    }
}

fn check_range(min: Option<f64>, max: Option<f64>, value: &Value) -> Option<Failure> {
    let Some(number) = data::as_number(value) else {
        return Some(Failure::new(ViolationKind::Type));
    };

    let below = min.is_some_and(|m| number < m);
    let above = max.is_some_and(|m| number > m);
    if !below && !above {
        return None;
    }

    let failure = match (min, max) {
        (Some(min), Some(max)) => Failure::new(ViolationKind::Range)
            .param("min", min)
            .param("max", max),
        (Some(min), None) => Failure::keyed(ViolationKind::Range, "range_min").param("min", min),
        (None, Some(max)) => Failure::keyed(ViolationKind::Range, "range_max").param("max", max),
        (None, None) => return None,
    };
    Some(failure.param("limit", (if below { min } else { max }).unwrap_or_default()))
}
