//! In-memory [`Host`] that records every call.
//!
//! Useful for testing migration definitions and for previewing what a run
//! would do without a database. Queued actions are logged when they are
//! queued and applied to the in-memory tables on `create()` / `update()`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{MigrateError, MigrateResult};
use crate::host::{Host, TableHandle};
use crate::limits::SizeLimits;
use crate::options::{TableSettings, keys};
use crate::schema::{ColumnInfo, ColumnSpec, IndexSpec, TableAction, same_columns};

/// One recorded host interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AddColumn { table: String, column: String, column_type: String },
    ChangeColumn { table: String, column: String, column_type: String },
    RemoveColumn { table: String, column: String },
    AddIndex { table: String, columns: Vec<String> },
    Create { table: String },
    Update { table: String },
    Execute { sql: String },
}

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    columns: Vec<ColumnInfo>,
    indices: Vec<Vec<String>>,
}

impl MemoryTable {
    /// Column names match case-insensitively, like MySQL's.
    fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn place(&mut self, spec: &ColumnSpec) {
        let mut info = ColumnInfo {
            name: spec.name.clone(),
            column_type: spec.column_type.to_string(),
            nullable: spec.options.get_bool(keys::NULL) == Some(true),
        };
        // A change keeps the stored spelling of the name.
        if let Some(existing) = self.position(&spec.name) {
            info.name = self.columns.remove(existing).name;
        }
        let at = spec
            .options
            .get_str(keys::AFTER)
            .and_then(|after| self.position(after))
            .map(|i| i + 1)
            .unwrap_or(self.columns.len());
        self.columns.insert(at, info);
    }

    fn apply(&mut self, action: &TableAction) {
        match action {
            TableAction::AddColumn(spec) | TableAction::ChangeColumn(spec) => self.place(spec),
            TableAction::RemoveColumn(name) => {
                if let Some(i) = self.position(name) {
                    self.columns.remove(i);
                }
            }
            TableAction::AddIndex(index) => self.indices.push(index.columns.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: BTreeMap<String, MemoryTable>,
    calls: Vec<Call>,
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory host. Clones share the same tables and call log.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    state: Arc<Mutex<MemoryState>>,
    limits: SizeLimits,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: SizeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Seed a live table with `columns` (typed as `string`).
    pub fn with_table(self, name: &str, columns: &[&str]) -> Self {
        {
            let mut state = lock(&self.state);
            let table = state.tables.entry(name.to_string()).or_default();
            for column in columns {
                table.columns.push(ColumnInfo {
                    name: column.to_string(),
                    column_type: "string".to_string(),
                    nullable: false,
                });
            }
        }
        self
    }

    /// Seed an existing index on `table`.
    pub fn with_index(self, table: &str, columns: &[&str]) -> Self {
        {
            let mut state = lock(&self.state);
            let cols = columns.iter().map(|c| c.to_string()).collect();
            state.tables.entry(table.to_string()).or_default().indices.push(cols);
        }
        self
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.state).calls.clone()
    }

    /// Column-level calls only (add/change/remove column, add index).
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::AddColumn { .. }
                        | Call::ChangeColumn { .. }
                        | Call::RemoveColumn { .. }
                        | Call::AddIndex { .. }
                )
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    pub fn has_table(&self, table: &str) -> bool {
        lock(&self.state).tables.contains_key(table)
    }

    /// Live column names in physical order, empty if the table is missing.
    pub fn column_names(&self, table: &str) -> Vec<String> {
        lock(&self.state)
            .tables
            .get(table)
            .map(|t| t.columns.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn index_columns(&self, table: &str) -> Vec<Vec<String>> {
        lock(&self.state)
            .tables
            .get(table)
            .map(|t| t.indices.clone())
            .unwrap_or_default()
    }

    /// Raw statements passed to [`Host::execute`].
    pub fn statements(&self) -> Vec<String> {
        lock(&self.state)
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Execute { sql } => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Host for MemoryHost {
    type Table = MemoryTableHandle;

    fn table(&self, name: &str, _settings: Option<&TableSettings>) -> Self::Table {
        MemoryTableHandle {
            state: Arc::clone(&self.state),
            name: name.to_string(),
            pending: Vec::new(),
        }
    }

    async fn execute(&self, sql: &str) -> MigrateResult<u64> {
        lock(&self.state).calls.push(Call::Execute {
            sql: sql.to_string(),
        });
        Ok(0)
    }

    fn size_limits(&self) -> SizeLimits {
        self.limits
    }
}

/// Table handle on a [`MemoryHost`].
#[derive(Debug)]
pub struct MemoryTableHandle {
    state: Arc<Mutex<MemoryState>>,
    name: String,
    pending: Vec<TableAction>,
}

impl MemoryTableHandle {
    fn record(&mut self, call: Call, action: TableAction) {
        lock(&self.state).calls.push(call);
        self.pending.push(action);
    }

    fn live<T>(&self, f: impl FnOnce(&MemoryTable) -> T) -> MigrateResult<T> {
        let state = lock(&self.state);
        let result = state.tables.get(&self.name).map(f);
        result.ok_or_else(|| MigrateError::TableNotFound(self.name.clone()))
    }
}

impl TableHandle for MemoryTableHandle {
    fn add_column(&mut self, column: &ColumnSpec) {
        let call = Call::AddColumn {
            table: self.name.clone(),
            column: column.name.clone(),
            column_type: column.column_type.to_string(),
        };
        self.record(call, TableAction::AddColumn(column.clone()));
    }

    fn change_column(&mut self, column: &ColumnSpec) {
        let call = Call::ChangeColumn {
            table: self.name.clone(),
            column: column.name.clone(),
            column_type: column.column_type.to_string(),
        };
        self.record(call, TableAction::ChangeColumn(column.clone()));
    }

    fn remove_column(&mut self, name: &str) {
        let call = Call::RemoveColumn {
            table: self.name.clone(),
            column: name.to_string(),
        };
        self.record(call, TableAction::RemoveColumn(name.to_string()));
    }

    fn add_index(&mut self, index: &IndexSpec) {
        let call = Call::AddIndex {
            table: self.name.clone(),
            columns: index.columns.clone(),
        };
        self.record(call, TableAction::AddIndex(index.clone()));
    }

    async fn has_column(&self, name: &str) -> MigrateResult<bool> {
        self.live(|t| t.position(name).is_some())
    }

    async fn columns(&self) -> MigrateResult<Vec<ColumnInfo>> {
        self.live(|t| t.columns.clone())
    }

    async fn has_index(&self, columns: &[String]) -> MigrateResult<bool> {
        self.live(|t| t.indices.iter().any(|idx| same_columns(idx, columns)))
    }

    async fn create(&mut self) -> MigrateResult<()> {
        let mut state = lock(&self.state);
        if state.tables.contains_key(&self.name) {
            return Err(MigrateError::TableExists(self.name.clone()));
        }

        let mut table = MemoryTable::default();
        for action in self.pending.drain(..) {
            table.apply(&action);
        }
        state.tables.insert(self.name.clone(), table);
        state.calls.push(Call::Create {
            table: self.name.clone(),
        });
        Ok(())
    }

    async fn update(&mut self) -> MigrateResult<()> {
        let mut state = lock(&self.state);
        let table = state
            .tables
            .get_mut(&self.name)
            .ok_or_else(|| MigrateError::TableNotFound(self.name.clone()))?;

        for action in self.pending.drain(..) {
            table.apply(&action);
        }
        state.calls.push(Call::Update {
            table: self.name.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ColumnOptions;
    use crate::types::ColumnType;

    fn spec(name: &str, after: Option<&str>) -> ColumnSpec {
        let mut options = ColumnOptions::new();
        if let Some(after) = after {
            options = options.after(after);
        }
        ColumnSpec::new(name, ColumnType::String, options)
    }

    #[test]
    fn test_after_places_column() {
        let mut table = MemoryTable::default();
        table.apply(&TableAction::AddColumn(spec("a", None)));
        table.apply(&TableAction::AddColumn(spec("c", Some("a"))));
        table.apply(&TableAction::AddColumn(spec("b", Some("a"))));

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_change_moves_column() {
        let mut table = MemoryTable::default();
        for name in ["a", "b", "c"] {
            table.apply(&TableAction::AddColumn(spec(name, None)));
        }
        table.apply(&TableAction::ChangeColumn(spec("a", Some("c"))));

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_change_matches_name_ignoring_case() {
        let mut table = MemoryTable::default();
        table.apply(&TableAction::AddColumn(spec("email", None)));
        table.apply(&TableAction::ChangeColumn(spec("Email", None)));

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["email"]);
        assert_eq!(table.position("EMAIL"), Some(0));
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let host = MemoryHost::new();
        let mut first = host.table("t", None);
        first.add_column(&spec("a", None));
        first.create().await.unwrap();

        let mut second = host.table("t", None);
        second.add_column(&spec("a", None));
        assert!(matches!(second.create().await, Err(MigrateError::TableExists(_))));
    }

    #[tokio::test]
    async fn test_update_missing_table_fails() {
        let host = MemoryHost::new();
        let mut table = host.table("missing", None);
        assert!(matches!(table.update().await, Err(MigrateError::TableNotFound(_))));
        assert!(table.has_column("x").await.is_err());
    }
}
