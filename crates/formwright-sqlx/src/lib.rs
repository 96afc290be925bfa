//! # formwright-sqlx
//!
//! A SQLite option source for formwright forms.
//!
//! [`OptionStore`] fills select and radio options from a table, counts rows
//! and reads column metadata so a form schema can be scaffolded from an
//! existing table. Table and column names are validated as plain identifiers
//! and quoted; filter values are always bound parameters.
//!
//! ```rust,no_run
//! use formwright::FormBuilder;
//! use formwright_sqlx::{Filter, OptionStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = OptionStore::connect("sqlite:app.db").await?;
//! let countries = store
//!     .options_where("countries", "code", "name", &[Filter::eq("active", true)])
//!     .await?;
//!
//! let mut builder = FormBuilder::create("address");
//! builder.add_select("country", "Country").options(countries).add()?;
//! # Ok(())
//! # }
//! ```

mod error;

use std::fmt;
use std::sync::LazyLock;

use formwright::{ConstraintSchema, FieldSchema, FieldType, FormSchema};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

pub use error::{Result, StoreError};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"));

static TYPE_LENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*(\d+)\s*\)").expect("length regex is valid"));

/// Validates `name` and returns it double-quoted.
fn quote_ident(name: &str) -> Result<String> {
    if IDENTIFIER.is_match(name) {
        Ok(format!("\"{name}\""))
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// A value compared against a column in a `WHERE` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    /// Rendered as `IS NULL`, nothing is bound.
    Null,
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// An equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: FilterValue,
}

impl Filter {
    /// `column = value`, or `column IS NULL` for [`FilterValue::Null`].
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    fn to_sql(&self) -> Result<String> {
        let column = quote_ident(&self.column)?;
        Ok(match self.value {
            FilterValue::Null => format!("{column} IS NULL"),
            _ => format!("{column} = ?"),
        })
    }
}

fn where_clause(filters: &[Filter]) -> Result<String> {
    if filters.is_empty() {
        return Ok(String::new());
    }
    let parts = filters
        .iter()
        .map(Filter::to_sql)
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(" WHERE {}", parts.join(" AND ")))
}

/// Binds every non-null filter value, in order.
macro_rules! bind_filters {
    ($query:expr, $filters:expr) => {{
        let mut query = $query;
        for filter in $filters {
            query = match &filter.value {
                FilterValue::Text(v) => query.bind(v.clone()),
                FilterValue::Integer(v) => query.bind(*v),
                FilterValue::Real(v) => query.bind(*v),
                FilterValue::Bool(v) => query.bind(*v),
                FilterValue::Null => query,
            };
        }
        query
    }};
}

/// One column as reported by `pragma_table_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type, e.g. `VARCHAR(120)`. Empty when undeclared.
    pub declared_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    pub primary_key: bool,
}

impl ColumnInfo {
    /// Field type suggested by the declared type, using SQLite affinity
    /// rules plus a few column-name hints.
    pub fn suggested_field_type(&self) -> FieldType {
        let ty = self.declared_type.to_ascii_uppercase();
        let name = self.name.to_ascii_lowercase();

        if self.primary_key {
            return FieldType::Hidden;
        }
        if ty.contains("BOOL") {
            return FieldType::Checkbox;
        }
        if ty.contains("DATETIME") || ty.contains("TIMESTAMP") {
            return FieldType::DateTime;
        }
        if ty.contains("DATE") {
            return FieldType::Date;
        }
        if ty.contains("TIME") {
            return FieldType::Time;
        }
        if ty.contains("INT")
            || ["REAL", "FLOA", "DOUB", "NUMERIC", "DECIMAL"]
                .iter()
                .any(|t| ty.contains(t))
        {
            return FieldType::Number;
        }
        if name.contains("password") {
            return FieldType::Password;
        }
        if name.contains("email") {
            return FieldType::Email;
        }
        if ty.contains("CLOB")
            || (ty == "TEXT" && ["body", "description", "notes"].contains(&name.as_str()))
        {
            return FieldType::Textarea;
        }
        FieldType::Text
    }

    /// Length from a declared type such as `VARCHAR(120)`.
    pub fn max_length(&self) -> Option<u64> {
        TYPE_LENGTH
            .captures(&self.declared_type)
            .and_then(|c| c[1].parse().ok())
    }

    /// A field description for this column.
    ///
    /// `NOT NULL` columns without a default become required; a declared
    /// length becomes a `max_length` constraint.
    pub fn to_field_schema(&self) -> FieldSchema {
        let field_type = self.suggested_field_type();
        let required = self.not_null
            && self.default.is_none()
            && !self.primary_key
            && field_type != FieldType::Checkbox;

        let mut constraints = Vec::new();
        let textual = matches!(
            field_type,
            FieldType::Text | FieldType::Email | FieldType::Password | FieldType::Textarea
        );
        if let Some(length) = self.max_length().filter(|_| textual) {
            constraints.push(ConstraintSchema {
                kind: "max_length".to_string(),
                value: Some(length.into()),
                ..ConstraintSchema::default()
            });
        }

        FieldSchema {
            name: self.name.clone(),
            field_type: field_type.as_str().to_string(),
            label: None,
            required,
            placeholder: None,
            help_text: None,
            class: None,
            attributes: IndexMap::new(),
            options: IndexMap::new(),
            initial: None,
            disabled: false,
            constraints,
        }
    }
}

/// Reads options, counts and column metadata from a SQLite database.
#[derive(Clone)]
pub struct OptionStore {
    pool: SqlitePool,
}

impl fmt::Debug for OptionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionStore").finish_non_exhaustive()
    }
}

impl OptionStore {
    /// Wraps an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `url` and checks that one connection can be made.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|source| StoreError::Connection {
                url: url.to_string(),
                source,
            })?;
        debug!(url, "Connected option store");
        Ok(Self::new(pool))
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// All `value => label` pairs of `table`, ordered by label.
    pub async fn options(
        &self,
        table: &str,
        value_column: &str,
        label_column: &str,
    ) -> Result<IndexMap<String, String>> {
        self.options_where(table, value_column, label_column, &[])
            .await
    }

    /// `value => label` pairs of the rows matching every filter.
    ///
    /// Rows with a NULL value are skipped; a NULL label falls back to the
    /// value.
    pub async fn options_where(
        &self,
        table: &str,
        value_column: &str,
        label_column: &str,
        filters: &[Filter],
    ) -> Result<IndexMap<String, String>> {
        let value = quote_ident(value_column)?;
        let label = quote_ident(label_column)?;
        let sql = format!(
            "SELECT CAST({value} AS TEXT), CAST({label} AS TEXT) FROM {}{} ORDER BY {label}, {value}",
            quote_ident(table)?,
            where_clause(filters)?,
        );
        debug!(%sql, filters = filters.len(), "Loading options");

        let query = sqlx::query_as::<_, (Option<String>, Option<String>)>(&sql);
        let rows = bind_filters!(query, filters).fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .filter_map(|(value, label)| {
                let value = value?;
                let label = label.unwrap_or_else(|| value.clone());
                Some((value, label))
            })
            .collect())
    }

    /// Number of rows of `table` matching every filter.
    pub async fn count(&self, table: &str, filters: &[Filter]) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            quote_ident(table)?,
            where_clause(filters)?
        );
        debug!(%sql, "Counting rows");

        let query = sqlx::query_as::<_, (i64,)>(&sql);
        let (count,) = bind_filters!(query, filters)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Columns of `table` in declaration order.
    pub async fn field_metadata(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        quote_ident(table)?;
        let rows: Vec<(String, String, i64, Option<String>, i64)> = sqlx::query_as(
            "SELECT CAST(name AS TEXT), CAST(type AS TEXT), \"notnull\", CAST(dflt_value AS TEXT), pk \
             FROM pragma_table_info(?1) ORDER BY cid",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(StoreError::UnknownTable(table.to_string()));
        }

        Ok(rows
            .into_iter()
            .map(|(name, declared_type, not_null, default, pk)| ColumnInfo {
                name,
                declared_type,
                not_null: not_null != 0,
                default,
                primary_key: pk != 0,
            })
            .collect())
    }

    /// A form schema with one field per column of `table`.
    pub async fn scaffold(&self, table: &str) -> Result<FormSchema> {
        let fields = self
            .field_metadata(table)
            .await?
            .iter()
            .map(ColumnInfo::to_field_schema)
            .collect();
        Ok(FormSchema {
            name: table.to_string(),
            fields,
            ..FormSchema::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_test_store() -> OptionStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::query(
            "CREATE TABLE countries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code VARCHAR(2) NOT NULL,
                name TEXT NOT NULL,
                active BOOLEAN NOT NULL DEFAULT 1,
                region TEXT
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        for (code, name, active, region) in [
            ("FR", "France", true, Some("EU")),
            ("BE", "Belgium", true, Some("EU")),
            ("DE", "Germany", false, Some("EU")),
            ("JP", "Japan", true, None),
        ] {
            sqlx::query("INSERT INTO countries (code, name, active, region) VALUES (?, ?, ?, ?)")
                .bind(code)
                .bind(name)
                .bind(active)
                .bind(region)
                .execute(&pool)
                .await
                .unwrap();
        }

        OptionStore::new(pool)
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users").unwrap(), "\"users\"");
        assert_eq!(quote_ident("_x1").unwrap(), "\"_x1\"");
        for bad in ["", "1users", "users; DROP TABLE users", "a\"b", "a b"] {
            assert!(matches!(
                quote_ident(bad),
                Err(StoreError::InvalidIdentifier(_))
            ));
        }
    }

    #[test]
    fn test_where_clause() {
        assert_eq!(where_clause(&[]).unwrap(), "");
        let clause = where_clause(&[
            Filter::eq("active", true),
            Filter::eq("region", None::<&str>),
        ])
        .unwrap();
        assert_eq!(clause, " WHERE \"active\" = ? AND \"region\" IS NULL");
    }

    #[tokio::test]
    async fn test_options_ordered_by_label() {
        let store = create_test_store().await;
        let options = store.options("countries", "code", "name").await.unwrap();

        let labels: Vec<&str> = options.values().map(String::as_str).collect();
        assert_eq!(labels, vec!["Belgium", "France", "Germany", "Japan"]);
        assert_eq!(options.get("FR").map(String::as_str), Some("France"));
    }

    #[tokio::test]
    async fn test_options_where() {
        let store = create_test_store().await;

        let active = store
            .options_where(
                "countries",
                "code",
                "name",
                &[Filter::eq("active", true), Filter::eq("region", "EU")],
            )
            .await
            .unwrap();
        assert_eq!(active.keys().collect::<Vec<_>>(), vec!["BE", "FR"]);

        let no_region = store
            .options_where("countries", "code", "name", &[Filter::eq("region", None::<&str>)])
            .await
            .unwrap();
        assert_eq!(no_region.keys().collect::<Vec<_>>(), vec!["JP"]);
    }

    #[tokio::test]
    async fn test_integer_values_are_text() {
        let store = create_test_store().await;
        let options = store.options("countries", "id", "name").await.unwrap();
        assert_eq!(options.get("1").map(String::as_str), Some("France"));
    }

    #[tokio::test]
    async fn test_filter_value_is_bound() {
        let store = create_test_store().await;
        let options = store
            .options_where(
                "countries",
                "code",
                "name",
                &[Filter::eq("name", "x' OR '1'='1")],
            )
            .await
            .unwrap();
        assert!(options.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_identifier_rejected() {
        let store = create_test_store().await;
        let err = store
            .options("countries; DROP TABLE countries", "code", "name")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidIdentifier(_)));

        // Table still there.
        assert_eq!(store.count("countries", &[]).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_count() {
        let store = create_test_store().await;
        assert_eq!(store.count("countries", &[]).await.unwrap(), 4);
        assert_eq!(
            store
                .count("countries", &[Filter::eq("active", false)])
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_missing_table_is_query_error() {
        let store = create_test_store().await;
        let err = store.count("cities", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[tokio::test]
    async fn test_field_metadata() {
        let store = create_test_store().await;
        let columns = store.field_metadata("countries").await.unwrap();

        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "code", "name", "active", "region"]);

        assert!(columns[0].primary_key);
        assert_eq!(columns[1].declared_type, "VARCHAR(2)");
        assert!(columns[1].not_null);
        assert_eq!(columns[3].default.as_deref(), Some("1"));
        assert!(!columns[4].not_null);

        let err = store.field_metadata("cities").await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownTable(_)));
    }

    #[tokio::test]
    async fn test_scaffold() {
        let store = create_test_store().await;
        let schema = store.scaffold("countries").await.unwrap();

        assert_eq!(schema.name, "countries");
        let types: Vec<&str> = schema.fields.iter().map(|f| f.field_type.as_str()).collect();
        assert_eq!(types, vec!["hidden", "text", "text", "checkbox", "text"]);

        let code = &schema.fields[1];
        assert!(code.required);
        assert_eq!(code.constraints[0].kind, "max_length");
        assert_eq!(code.constraints[0].value, Some(serde_json::json!(2)));
        assert!(!schema.fields[4].required);

        // The scaffold is a usable form.
        let definition = formwright::FormBuilder::from_schema(&schema)
            .unwrap()
            .build_definition()
            .unwrap();
        assert_eq!(definition.fields().count(), 5);
    }

    #[test]
    fn test_suggested_field_type() {
        let column = |name: &str, ty: &str| ColumnInfo {
            name: name.to_string(),
            declared_type: ty.to_string(),
            not_null: false,
            default: None,
            primary_key: false,
        };
        assert_eq!(column("age", "INTEGER").suggested_field_type(), FieldType::Number);
        assert_eq!(column("price", "DECIMAL(10,2)").suggested_field_type(), FieldType::Number);
        assert_eq!(column("born", "DATE").suggested_field_type(), FieldType::Date);
        assert_eq!(column("seen", "DATETIME").suggested_field_type(), FieldType::DateTime);
        assert_eq!(column("opens", "TIME").suggested_field_type(), FieldType::Time);
        assert_eq!(column("email", "VARCHAR(255)").suggested_field_type(), FieldType::Email);
        assert_eq!(column("password_hash", "TEXT").suggested_field_type(), FieldType::Password);
        assert_eq!(column("body", "TEXT").suggested_field_type(), FieldType::Textarea);
        assert_eq!(column("title", "TEXT").suggested_field_type(), FieldType::Text);
        assert_eq!(column("title", "").suggested_field_type(), FieldType::Text);
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let err = OptionStore::connect("sqlite:/nonexistent-dir/forms.db")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Connection { .. }));
    }
}
