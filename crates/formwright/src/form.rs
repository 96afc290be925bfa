//! Form runtime: a definition bound to data.

use std::fmt;
use std::sync::{Arc, LazyLock};

use serde_json::Value;

use crate::constraint::DEFAULT_GROUP;
use crate::data::{self, FormData};
use crate::definition::FormDefinition;
use crate::engine::ConstraintEngine;
use crate::error::ConfigurationError;
use crate::violation::ViolationTree;

static EMPTY_TREE: LazyLock<ViolationTree> = LazyLock::new(ViolationTree::new);

/// Lifecycle of a [`Form`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// No data bound yet.
    Unbound,
    /// Data bound, not validated since the last change.
    Bound,
    /// Violations computed and cached.
    Validated,
}

/// A [`FormDefinition`] bound to request data.
///
/// Forms are cheap and request-local; the definition and engine are shared.
/// ```
/// use formwright::{FormBuilder, FormData};
/// use serde_json::json;
///
/// let mut builder = FormBuilder::create("contact");
/// builder.add_text("name", "Name").required().add().unwrap();
/// let mut form = builder.build_form().unwrap();
///
/// let data: FormData = serde_json::from_value(json!({"name": ""})).unwrap();
/// form.submit(data);
/// assert!(!form.is_valid().unwrap());
/// ```
#[derive(Clone)]
pub struct Form {
    definition: Arc<FormDefinition>,
    engine: Arc<ConstraintEngine>,
    data: FormData,
    bound: bool,
    submitted: bool,
    groups: Vec<String>,
    violations: Option<ViolationTree>,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("name", &self.definition.name())
            .field("state", &self.state())
            .field("submitted", &self.submitted)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl Form {
    /// Creates an unbound form in add mode.
    pub fn new(definition: Arc<FormDefinition>) -> Self {
        Self {
            definition,
            engine: Arc::new(ConstraintEngine::new()),
            data: FormData::new(),
            bound: false,
            submitted: false,
            groups: vec![DEFAULT_GROUP.to_string()],
            violations: None,
        }
    }

    /// Creates a form in edit mode, bound to existing data but not submitted.
    pub fn with_data(definition: Arc<FormDefinition>, data: FormData) -> Self {
        let mut form = Self::new(definition);
        form.set_data(data);
        form
    }

    /// Uses `engine` for validation.
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<ConstraintEngine>) -> Self {
        self.engine = engine;
        self.violations = None;
        self
    }

    /// Merges submitted input over the current data.
    pub fn submit(&mut self, input: FormData) {
        data::merge(&mut self.data, input);
        self.bound = true;
        self.submitted = true;
        self.violations = None;
    }

    /// Replaces the data without marking the form submitted.
    pub fn set_data(&mut self, data: FormData) {
        self.data = data;
        self.bound = true;
        self.violations = None;
    }

    /// Selects the validation groups for the next validation pass.
    pub fn set_validation_groups<I, S>(&mut self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self.violations = None;
    }

    /// Active validation groups.
    pub fn validation_groups(&self) -> &[String] {
        &self.groups
    }

    /// Validates if needed and returns whether no constraint failed.
    ///
    /// An unbound form is never valid.
    ///
    /// # Errors
    ///
    /// Propagates configuration errors from the engine, e.g. a named
    /// callback that is not registered.
    pub fn is_valid(&mut self) -> Result<bool, ConfigurationError> {
        if !self.bound {
            return Ok(false);
        }
        Ok(self.violations()?.is_empty())
    }

    /// Validates if needed and returns the violation tree.
    ///
    /// The tree is cached until the data or the groups change.
    pub fn violations(&mut self) -> Result<&ViolationTree, ConfigurationError> {
        if !self.bound {
            return Ok(&*EMPTY_TREE);
        }
        if self.violations.is_none() {
            let tree = self.engine.evaluate(&self.definition, &self.data, &self.groups)?;
            self.violations = Some(tree);
        }
        Ok(self.violations.get_or_insert_with(ViolationTree::new))
    }

    /// The cached tree, if the form has been validated.
    pub fn cached_violations(&self) -> Option<&ViolationTree> {
        self.violations.as_ref()
    }

    /// Values of the declared fields, once the form validated cleanly.
    ///
    /// Keys not declared by the form and submit buttons are dropped.
    pub fn validated_data(&self) -> Option<FormData> {
        if self.state() != FormState::Validated || !self.violations.as_ref().is_some_and(ViolationTree::is_empty) {
            return None;
        }
        let clean = self
            .definition
            .fields()
            .filter(|f| !f.field_type.is_button())
            .filter_map(|f| data::lookup(&self.data, &f.name).map(|v| (f.name.clone(), v.clone())))
            .collect();
        Some(clean)
    }

    /// Value at a dot-addressed path.
    pub fn value(&self, path: &str) -> Option<&Value> {
        data::lookup(&self.data, path)
    }

    /// Bound data.
    pub fn data(&self) -> &FormData {
        &self.data
    }

    /// Current lifecycle state.
    pub fn state(&self) -> FormState {
        match (self.bound, self.violations.is_some()) {
            (false, _) => FormState::Unbound,
            (true, false) => FormState::Bound,
            (true, true) => FormState::Validated,
        }
    }

    /// Whether data came from a submission rather than `set_data`.
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// The shared definition.
    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    /// The shared definition, for binding another form.
    pub fn shared_definition(&self) -> Arc<FormDefinition> {
        Arc::clone(&self.definition)
    }

    /// The validation engine.
    pub fn engine(&self) -> &ConstraintEngine {
        &self.engine
    }
}
