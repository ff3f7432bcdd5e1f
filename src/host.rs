//! The seam between a migration definition and the framework that runs it.
//!
//! A [`Host`] hands out table handles and executes raw statements. A
//! [`TableHandle`] queues column/index mutations and commits them with
//! [`TableHandle::create`] or [`TableHandle::update`]. Validation of types,
//! options and duplicate creation belongs to the host.

use crate::error::MigrateResult;
use crate::limits::SizeLimits;
use crate::options::TableSettings;
use crate::schema::{ColumnInfo, ColumnSpec, IndexSpec};

/// Table factory and raw statement executor.
#[allow(async_fn_in_trait)]
pub trait Host {
    type Table: TableHandle;

    /// Open a handle on `name`. Settings are only consulted on creation.
    fn table(&self, name: &str, settings: Option<&TableSettings>) -> Self::Table;

    /// Run a raw statement, returning the affected row count.
    async fn execute(&self, sql: &str) -> MigrateResult<u64>;

    /// Width constants for tiered text/integer types.
    fn size_limits(&self) -> SizeLimits {
        SizeLimits::MYSQL
    }
}

/// Handle on a single table.
#[allow(async_fn_in_trait)]
pub trait TableHandle {
    fn add_column(&mut self, column: &ColumnSpec);

    fn change_column(&mut self, column: &ColumnSpec);

    fn remove_column(&mut self, name: &str);

    fn add_index(&mut self, index: &IndexSpec);

    async fn has_column(&self, name: &str) -> MigrateResult<bool>;

    /// Live columns in physical order.
    async fn columns(&self) -> MigrateResult<Vec<ColumnInfo>>;

    /// Whether an index on exactly `columns` exists on the live table.
    async fn has_index(&self, columns: &[String]) -> MigrateResult<bool>;

    /// Create the table from the queued columns and indexes.
    async fn create(&mut self) -> MigrateResult<()>;

    /// Apply the queued mutations to the existing table.
    async fn update(&mut self) -> MigrateResult<()>;
}
