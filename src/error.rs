//! Error types for migrate-kit.

use thiserror::Error;

/// The main error type for migration operations.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A migration was defined without a table name.
    #[error("Table name must not be empty")]
    EmptyTableName,

    /// A column was declared without a name.
    #[error("Column name must not be empty")]
    EmptyColumnName,

    /// The same column name was declared twice for one table.
    #[error("Column '{0}' is already defined")]
    DuplicateColumn(String),

    /// `create()` was committed for a table that already exists.
    #[error("Table '{0}' already exists")]
    TableExists(String),

    /// `update()` or an introspection call targeted a missing table.
    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    /// Database driver error.
    #[error("Database error: {0}")]
    Database(String),

    /// Statement execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for MigrateError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<toml::de::Error> for MigrateError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrateError::DuplicateColumn("email".into());
        assert_eq!(err.to_string(), "Column 'email' is already defined");
        assert_eq!(
            MigrateError::TableNotFound("users".into()).to_string(),
            "Table 'users' does not exist"
        );
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let err: MigrateError = toml::from_str::<toml::Value>("= broken")
            .unwrap_err()
            .into();
        assert!(matches!(err, MigrateError::Config(_)));
    }
}
