//! Error types for the option store.

/// Errors that can occur while reading options from the database.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The pool could not be opened.
    #[error("Failed to connect to '{url}': {source}")]
    Connection {
        /// Connection URL as given.
        url: String,
        /// Underlying driver error.
        #[source]
        source: sqlx::Error,
    },

    /// A query failed.
    #[error("Database error: {0}")]
    Query(#[from] sqlx::Error),

    /// A table or column name is not a plain SQL identifier.
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// `field_metadata` found no columns.
    #[error("Table not found: {0}")]
    UnknownTable(String),
}

/// Result type for option store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
