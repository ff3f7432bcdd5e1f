//! Accumulated column/index specifications and the actions hosts queue.

use crate::options::{ColumnOptions, IndexOptions};
use crate::types::ColumnType;

/// A column declared on a migration, after alias resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
    pub options: ColumnOptions,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType, options: ColumnOptions) -> Self {
        Self {
            name: name.into(),
            column_type,
            options,
        }
    }
}

/// An index declared on a migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub columns: Vec<String>,
    pub options: IndexOptions,
}

impl IndexSpec {
    pub fn new<I, S>(columns: I, options: IndexOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            options,
        }
    }

    /// Whether this index covers exactly `columns`, in order, ignoring case.
    pub fn covers(&self, columns: &[String]) -> bool {
        same_columns(&self.columns, columns)
    }
}

/// Column list equality used for index existence checks.
pub fn same_columns(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}

/// A column as reported by the live database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: String,
    pub nullable: bool,
}

impl ColumnInfo {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A mutation queued on a table handle until `create()` / `update()`.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    AddColumn(ColumnSpec),
    ChangeColumn(ColumnSpec),
    RemoveColumn(String),
    AddIndex(IndexSpec),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_covers() {
        let idx = IndexSpec::new(["x", "y"], IndexOptions::new());
        assert!(idx.covers(&["X".to_string(), "y".to_string()]));
        assert!(!idx.covers(&["y".to_string(), "x".to_string()]));
        assert!(!idx.covers(&["x".to_string()]));
    }
}
