//! Translation catalogs.
//!
//! A [`Catalog`] is a flat key/value map. Loaders read nested YAML or JSON
//! documents and flatten them with dots, so
//!
//! ```yaml
//! form:
//!   label:
//!     email: E-mail address
//! ```
//!
//! becomes `form.label.email`. Lookups that miss fall back to the literal
//! label or message configured on the form.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::TranslationError;

/// Flattened translation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens a nested document. Returns `None` if the root is not a map.
    pub fn from_value(value: &Value) -> Option<Self> {
        let Value::Object(root) = value else {
            return None;
        };
        let mut catalog = Self::new();
        for (key, child) in root {
            catalog.flatten(key, child);
        }
        Some(catalog)
    }

    fn flatten(&mut self, prefix: &str, value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.flatten(&format!("{prefix}.{key}"), child);
                }
            }
            Value::Null => {}
            Value::String(s) => {
                self.messages.insert(prefix.to_string(), s.clone());
            }
            other => {
                self.messages.insert(prefix.to_string(), other.to_string());
            }
        }
    }

    /// Adds or replaces a message.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(key, message);
        self
    }

    /// Adds or replaces a message.
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    /// Copies every message of `other` over this catalog.
    pub fn merge(&mut self, other: Self) {
        self.messages.extend(other.messages);
    }

    /// Looks up a raw key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Label for a field, `form.label.<name>`.
    pub fn label<'a>(&'a self, field: &str, fallback: &'a str) -> &'a str {
        self.get(&format!("form.label.{field}")).unwrap_or(fallback)
    }

    /// Placeholder for a field, `form.placeholder.<name>`.
    pub fn placeholder(&self, field: &str) -> Option<&str> {
        self.get(&format!("form.placeholder.{field}"))
    }

    /// Error message template, `form.error.<key>`.
    pub fn error(&self, key: &str) -> Option<&str> {
        self.get(&format!("form.error.{key}"))
    }

    /// Button caption, `form.button.<name>`.
    pub fn button<'a>(&'a self, name: &str, fallback: &'a str) -> &'a str {
        self.get(&format!("form.button.{name}")).unwrap_or(fallback)
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns whether the catalog has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Reads a translation file into a [`Catalog`].
pub trait TranslationLoader {
    /// Loads and flattens the file at `path`.
    fn load(&self, path: &Path) -> Result<Catalog, TranslationError>;
}

/// Loads `.yaml` / `.yml` translation files.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlLoader;

impl TranslationLoader for YamlLoader {
    fn load(&self, path: &Path) -> Result<Catalog, TranslationError> {
        let text = read(path)?;
        let value: Value = serde_yaml::from_str(&text)?;
        Catalog::from_value(&value).ok_or_else(|| TranslationError::NotAMapping(path.to_path_buf()))
    }
}

/// Loads `.json` translation files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl TranslationLoader for JsonLoader {
    fn load(&self, path: &Path) -> Result<Catalog, TranslationError> {
        let text = read(path)?;
        let value: Value = serde_json::from_str(&text)?;
        Catalog::from_value(&value).ok_or_else(|| TranslationError::NotAMapping(path.to_path_buf()))
    }
}

/// Loads a catalog, picking the loader from the file extension.
pub fn load_catalog(path: &Path) -> Result<Catalog, TranslationError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => YamlLoader.load(path),
        Some("json") => JsonLoader.load(path),
        _ => Err(TranslationError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn read(path: &Path) -> Result<String, TranslationError> {
    fs::read_to_string(path).map_err(|source| TranslationError::Io {
        path: path.to_path_buf(),
        source,
    })
}
