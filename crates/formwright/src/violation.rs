//! Violations and the path-keyed violation tree.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constraint::ViolationKind;

/// Path for messages that belong to the form as a whole.
pub const FORM_PATH: &str = "__all__";

/// One failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dot-addressed location of the offending value.
    pub path: String,
    /// Interpolated message.
    pub message: String,
    /// What failed.
    pub kind: ViolationKind,
}

impl Violation {
    /// Creates a violation.
    pub fn new(path: impl Into<String>, message: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }
}

/// All violations from one validation pass, keyed by path.
///
/// Paths keep the order in which they first failed and each path keeps its
/// violations in evaluation order. A path without violations is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationTree {
    entries: IndexMap<String, Vec<Violation>>,
}

impl ViolationTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation under its path.
    pub fn add(&mut self, violation: Violation) {
        self.entries
            .entry(violation.path.clone())
            .or_default()
            .push(violation);
    }

    /// Returns whether no constraint failed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of paths with at least one violation.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of violations across all paths.
    pub fn violation_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Violations recorded for a path.
    pub fn get(&self, path: &str) -> Option<&[Violation]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// Returns whether a path has violations.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Messages recorded for a path, in order.
    pub fn messages(&self, path: &str) -> Vec<&str> {
        self.get(path)
            .map(|v| v.iter().map(|v| v.message.as_str()).collect())
            .unwrap_or_default()
    }

    /// Form-level messages (recorded under [`FORM_PATH`]).
    pub fn form_messages(&self) -> Vec<&str> {
        self.messages(FORM_PATH)
    }

    /// Paths with violations, in first-failure order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(path, violations)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Violation])> {
        self.entries
            .iter()
            .map(|(path, v)| (path.as_str(), v.as_slice()))
    }

    /// Flat form: path -> messages.
    pub fn to_flat(&self) -> IndexMap<String, Vec<String>> {
        self.entries
            .iter()
            .map(|(path, v)| (path.clone(), v.iter().map(|v| v.message.clone()).collect()))
            .collect()
    }

    /// Deep form: dot paths expanded into nested objects.
    ///
    /// A node that has both its own messages and nested children keeps its
    /// own messages under the [`FORM_PATH`] key.
    pub fn to_deep(&self) -> Value {
        let mut root = Map::new();
        for (path, violations) in &self.entries {
            let messages: Vec<Value> = violations
                .iter()
                .map(|v| Value::String(v.message.clone()))
                .collect();
            insert_deep(&mut root, path, messages);
        }
        Value::Object(root)
    }
}

fn insert_deep(root: &mut Map<String, Value>, path: &str, messages: Vec<Value>) {
    let segments: Vec<&str> = path.split('.').collect();
    let (leaf, parents) = match segments.split_last() {
        Some(split) => split,
        None => return,
    };

    let mut node = root;
    for segment in parents {
        let entry = node
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            let own = entry.take();
            let mut wrapped = Map::new();
            wrapped.insert(FORM_PATH.to_string(), own);
            *entry = Value::Object(wrapped);
        }
        node = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }

    match node.get_mut(*leaf) {
        Some(Value::Object(children)) => append_messages(children, FORM_PATH, messages),
        Some(Value::Array(existing)) => existing.extend(messages),
        _ => {
            node.insert((*leaf).to_string(), Value::Array(messages));
        }
    }
}

fn append_messages(map: &mut Map<String, Value>, key: &str, messages: Vec<Value>) {
    match map.get_mut(key) {
        Some(Value::Array(existing)) => existing.extend(messages),
        _ => {
            map.insert(key.to_string(), Value::Array(messages));
        }
    }
}

impl Serialize for ViolationTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, violations) in &self.entries {
            let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
            map.serialize_entry(path, &messages)?;
        }
        map.end()
    }
}

impl fmt::Display for ViolationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, violations) in &self.entries {
            for violation in violations {
                writeln!(f, "{path}: {}", violation.message)?;
            }
        }
        Ok(())
    }
}

/// Handed to callback constraints so they can report violations.
#[derive(Debug)]
pub struct ExecutionContext {
    field: Option<String>,
    violations: Vec<Violation>,
}

impl ExecutionContext {
    pub(crate) fn new(field: Option<&str>) -> Self {
        Self {
            field: field.map(str::to_string),
            violations: Vec::new(),
        }
    }

    /// Path of the field the callback is attached to, `None` for form-level
    /// constraints.
    pub fn field_path(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Reports a violation at any path.
    pub fn add_violation(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations
            .push(Violation::new(path, message, ViolationKind::Callback));
    }

    /// Reports a violation against the attached field, or the form when the
    /// callback is form-level.
    pub fn add_field_violation(&mut self, message: impl Into<String>) {
        let path = self.field.clone().unwrap_or_else(|| FORM_PATH.to_string());
        self.add_violation(path, message);
    }

    /// Reports a form-level violation.
    pub fn add_form_violation(&mut self, message: impl Into<String>) {
        self.add_violation(FORM_PATH, message);
    }

    pub(crate) fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}
