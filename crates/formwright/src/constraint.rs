//! Validation constraints.
//!
//! A [`Constraint`] pairs a [`ConstraintKind`] with an optional custom message
//! and the validation groups it belongs to. Evaluation lives in
//! [`ConstraintEngine`](crate::ConstraintEngine).

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use serde::Serialize;

use crate::data::FormData;
use crate::violation::ExecutionContext;

/// Group every constraint belongs to unless told otherwise.
pub const DEFAULT_GROUP: &str = "Default";

type CallbackFn = dyn Fn(&FormData, &mut ExecutionContext) + Send + Sync;

/// A custom validation function.
///
/// Receives the full data set, so cross-field rules (password confirmation,
/// date ranges) can inspect any value and report against any path.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&FormData, &mut ExecutionContext) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn call(&self, data: &FormData, ctx: &mut ExecutionContext) {
        (self.0)(data, ctx);
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// What a constraint checks.
#[derive(Debug, Clone)]
pub enum ConstraintKind {
    /// Value must be present and non-empty.
    Required,
    /// Stringified value must have at least this many characters.
    MinLength(usize),
    /// Stringified value must have at most this many characters.
    MaxLength(usize),
    /// Value must be numeric and inside the given bounds.
    Range { min: Option<f64>, max: Option<f64> },
    /// Value must match the regular expression.
    Pattern(Regex),
    /// Value must look like an email address.
    Email,
    /// Custom function.
    Callback(Callback),
    /// Callback registered with the engine under this name.
    Named(String),
}

impl ConstraintKind {
    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength(_) => "min_length",
            Self::MaxLength(_) => "max_length",
            Self::Range { .. } => "range",
            Self::Pattern(_) => "pattern",
            Self::Email => "email",
            Self::Callback(_) => "callback",
            Self::Named(_) => "named callback",
        }
    }

    /// Whether the kind runs a function over the whole data set.
    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback(_) | Self::Named(_))
    }
}

/// A single validation rule.
#[derive(Debug, Clone)]
pub struct Constraint {
    /// The rule.
    pub kind: ConstraintKind,
    /// Message template overriding the default one.
    pub message: Option<String>,
    /// Validation groups this constraint belongs to.
    pub groups: Vec<String>,
}

impl Constraint {
    /// Creates a constraint in the default group.
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            kind,
            message: None,
            groups: vec![DEFAULT_GROUP.to_string()],
        }
    }

    /// Value must be present and non-empty.
    pub fn required() -> Self {
        Self::new(ConstraintKind::Required)
    }

    /// Minimum length in characters.
    pub fn min_length(limit: usize) -> Self {
        Self::new(ConstraintKind::MinLength(limit))
    }

    /// Maximum length in characters.
    pub fn max_length(limit: usize) -> Self {
        Self::new(ConstraintKind::MaxLength(limit))
    }

    /// Numeric bounds; either may be open.
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(ConstraintKind::Range { min, max })
    }

    /// Regular expression match.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(ConstraintKind::Pattern(Regex::new(pattern)?)))
    }

    /// Email address format.
    pub fn email() -> Self {
        Self::new(ConstraintKind::Email)
    }

    /// Custom callback.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&FormData, &mut ExecutionContext) + Send + Sync + 'static,
    {
        Self::new(ConstraintKind::Callback(Callback::new(f)))
    }

    /// Callback resolved by name when the form is validated.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Named(name.into()))
    }

    /// Replaces the default message. `{{ limit }}`, `{{ min }}`, `{{ max }}`,
    /// `{{ value }}`, `{{ label }}` and `{{ field }}` are interpolated.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Replaces the groups this constraint belongs to.
    #[must_use]
    pub fn in_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Returns whether this constraint runs for the given active groups.
    pub fn applies_to(&self, active: &[String]) -> bool {
        self.groups.iter().any(|g| active.contains(g))
    }

    pub(crate) fn is_range(&self) -> bool {
        matches!(self.kind, ConstraintKind::Range { .. })
    }
}

/// Category of a failed constraint, as reported in violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Required,
    MinLength,
    MaxLength,
    Range,
    /// A numeric constraint received a non-numeric value.
    Type,
    Pattern,
    Email,
    Callback,
}

impl ViolationKind {
    /// Stable name, also used for `form.error.*` translation keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::Range => "range",
            Self::Type => "type",
            Self::Pattern => "pattern",
            Self::Email => "email",
            Self::Callback => "callback",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in message templates, keyed like the `form.error.*` catalog entries.
pub(crate) fn default_message(key: &str) -> &'static str {
    match key {
        "required" => "This field is required.",
        "min_length" => "Ensure this value has at least {{ limit }} characters.",
        "max_length" => "Ensure this value has at most {{ limit }} characters.",
        "range" => "Ensure this value is between {{ min }} and {{ max }}.",
        "range_min" => "Ensure this value is greater than or equal to {{ min }}.",
        "range_max" => "Ensure this value is less than or equal to {{ max }}.",
        "type" => "Enter a valid number.",
        "pattern" => "Enter a valid value.",
        "email" => "Enter a valid email address.",
        _ => "Invalid value.",
    }
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder regex is valid"));

/// Substitutes `{{ name }}` placeholders in one pass, so substituted text is
/// never expanded again. Unknown names are left as written.
pub(crate) fn interpolate(template: &str, params: &[(&str, String)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            params
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.clone())
        })
        .into_owned()
}
