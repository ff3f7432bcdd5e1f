//! Column/index accumulator for one logical table.
//!
//! A [`Migration`] is built fresh for each migration run: declare columns and
//! indexes, then call the table operations you need against a [`Host`].
//!
//! ```rust,ignore
//! let mut users = Migration::for_host("users", &host);
//! users
//!     .set_column("email", "varchar", ColumnOptions::new().limit(191u32))?
//!     .set_column("bio", "mediumtext", ColumnOptions::new().nullable(true))?
//!     .created_at()?
//!     .updated_at()?;
//! users.index(["email"], IndexOptions::new().unique());
//!
//! users.update_table(&host).await?;
//! users.add_indices_table(&host).await?;
//! ```

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{MigrateError, MigrateResult};
use crate::host::{Host, TableHandle};
use crate::limits::SizeLimits;
use crate::options::{CURRENT_TIMESTAMP, ColumnOptions, IndexOptions, TableSettings, keys};
use crate::schema::{ColumnSpec, IndexSpec};
use crate::types::{ColumnType, SizeTier};

/// Declarative column/index list for a single table.
#[derive(Debug, Clone)]
pub struct Migration {
    name: String,
    settings: TableSettings,
    columns: Vec<ColumnSpec>,
    indices: Vec<IndexSpec>,
    limits: SizeLimits,
}

impl Migration {
    /// Start a definition for table (or view) `name` using MySQL size limits.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: TableSettings::default(),
            columns: Vec::new(),
            indices: Vec::new(),
            limits: SizeLimits::MYSQL,
        }
    }

    /// Start a definition whose size limits come from `host`.
    pub fn for_host<H: Host>(name: impl Into<String>, host: &H) -> Self {
        Self::new(name).with_limits(host.size_limits())
    }

    pub fn with_settings(mut self, settings: TableSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_limits(mut self, limits: SizeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    /// Accumulated columns in declaration order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn indices(&self) -> &[IndexSpec] {
        &self.indices
    }

    /// Declare a column.
    ///
    /// The tag is matched case-insensitively. Tiered tags (`tinytext`,
    /// `bigint`, ...) get the host's `limit` unless `options` already has
    /// one. Every column after the first is placed after its predecessor.
    pub fn set_column(
        &mut self,
        name: impl Into<String>,
        column_type: &str,
        options: ColumnOptions,
    ) -> MigrateResult<&mut Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(MigrateError::EmptyColumnName);
        }
        if self.columns.iter().any(|c| c.name.eq_ignore_ascii_case(&name)) {
            return Err(MigrateError::DuplicateColumn(name));
        }

        let tag = column_type.to_lowercase();
        let mut options = options;

        if let Some(tier) = SizeTier::for_tag(&tag) {
            if !options.contains(keys::LIMIT) {
                options.insert(keys::LIMIT, self.limits.get(tier));
            }
        }

        if let Some(previous) = self.columns.len().checked_sub(1) {
            let after = self.columns[previous].name.clone();
            options.insert(keys::AFTER, after);
        }

        let column_type = ColumnType::from_tag(&tag);
        debug!("{}: column {} {} ({} options)", self.name, name, column_type, options.len());
        self.columns.push(ColumnSpec::new(name, column_type, options));
        Ok(self)
    }

    /// `created_at` timestamp, NOT NULL, defaulting to the insert time.
    pub fn created_at(&mut self) -> MigrateResult<&mut Self> {
        self.created_at_named("created_at")
    }

    pub fn created_at_named(&mut self, name: &str) -> MigrateResult<&mut Self> {
        self.set_column(
            name,
            "timestamp",
            ColumnOptions::new()
                .nullable(false)
                .default_value(CURRENT_TIMESTAMP),
        )
    }

    /// `updated_at` timestamp, refreshed on every row update.
    pub fn updated_at(&mut self) -> MigrateResult<&mut Self> {
        self.updated_at_named("updated_at")
    }

    pub fn updated_at_named(&mut self, name: &str) -> MigrateResult<&mut Self> {
        self.set_column(
            name,
            "timestamp",
            ColumnOptions::new()
                .nullable(false)
                .default_value(CURRENT_TIMESTAMP)
                .on_update(CURRENT_TIMESTAMP),
        )
    }

    /// Nullable soft-delete marker.
    pub fn deleted_at(&mut self) -> MigrateResult<&mut Self> {
        self.deleted_at_named("deleted_at")
    }

    pub fn deleted_at_named(&mut self, name: &str) -> MigrateResult<&mut Self> {
        self.set_column(name, "timestamp", ColumnOptions::new().nullable(true))
    }

    /// Declare an index. Specs with no columns are kept but never applied.
    pub fn index<I, S>(&mut self, columns: I, options: IndexOptions) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = IndexSpec::new(columns, options);
        debug!("{}: index on ({})", self.name, spec.columns.join(", "));
        self.indices.push(spec);
        self
    }

    fn table_name(&self) -> MigrateResult<&str> {
        if self.name.is_empty() {
            return Err(MigrateError::EmptyTableName);
        }
        Ok(&self.name)
    }

    /// Create the table with every declared column. Does nothing when no
    /// column was declared.
    ///
    /// Run at most once per table: a second creation fails in the host.
    pub async fn create_table<H: Host>(&self, host: &H) -> MigrateResult<()> {
        if self.columns.is_empty() {
            debug!("{}: no columns, skipping create", self.name);
            return Ok(());
        }

        let mut table = host.table(self.table_name()?, Some(&self.settings));
        for column in &self.columns {
            table.add_column(column);
        }
        table.create().await?;

        info!("{}: created with {} columns", self.name, self.columns.len());
        Ok(())
    }

    /// Add missing columns and change existing ones to match the declaration.
    pub async fn update_table<H: Host>(&self, host: &H) -> MigrateResult<()> {
        if self.columns.is_empty() {
            debug!("{}: no columns, skipping update", self.name);
            return Ok(());
        }

        let mut table = host.table(self.table_name()?, None);
        let mut added = 0usize;
        for column in &self.columns {
            if table.has_column(&column.name).await? {
                table.change_column(column);
            } else {
                table.add_column(column);
                added += 1;
            }
        }
        table.update().await?;

        info!(
            "{}: updated ({} added, {} changed)",
            self.name,
            added,
            self.columns.len() - added
        );
        Ok(())
    }

    /// Drop every live column that is not declared. Names match
    /// case-insensitively, as MySQL column names do.
    ///
    /// Does nothing when no column was declared, so an empty definition can
    /// never wipe a table. Otherwise destructive, with no dry run at this
    /// level.
    pub async fn remove_unnecessary_columns<H: Host>(&self, host: &H) -> MigrateResult<()> {
        if self.columns.is_empty() {
            debug!("{}: no columns, skipping prune", self.name);
            return Ok(());
        }

        let mut table = host.table(self.table_name()?, None);
        let needed: HashSet<String> = self
            .columns
            .iter()
            .map(|c| c.name.to_ascii_lowercase())
            .collect();

        let mut dropped = 0usize;
        for live in table.columns().await? {
            if !needed.contains(&live.name().to_ascii_lowercase()) {
                warn!("{}: dropping column {}", self.name, live.name());
                table.remove_column(live.name());
                dropped += 1;
            }
        }
        table.update().await?;

        info!("{}: {} columns dropped", self.name, dropped);
        Ok(())
    }

    /// Add every declared index whose column list is not indexed yet.
    pub async fn add_indices_table<H: Host>(&self, host: &H) -> MigrateResult<()> {
        if self.indices.is_empty() {
            debug!("{}: no indices, skipping", self.name);
            return Ok(());
        }

        let mut table = host.table(self.table_name()?, None);
        let mut queued: Vec<&IndexSpec> = Vec::new();

        for index in &self.indices {
            if index.columns.is_empty() {
                continue;
            }
            if queued.iter().any(|spec| spec.covers(&index.columns)) {
                continue;
            }
            if table.has_index(&index.columns).await? {
                debug!("{}: index ({}) exists", self.name, index.columns.join(", "));
                continue;
            }
            table.add_index(index);
            queued.push(index);
        }
        table.update().await?;

        info!("{}: {} indices added", self.name, queued.len());
        Ok(())
    }

    /// `CREATE OR REPLACE VIEW <name> AS <select>`.
    ///
    /// Neither part is escaped: both must be developer-authored constants,
    /// never end-user input.
    pub fn view_sql(&self, select: &str) -> String {
        format!("CREATE OR REPLACE VIEW {} AS {}", self.name, select)
    }

    /// Submit [`Migration::view_sql`] as a raw statement. Driver errors are
    /// returned as-is.
    pub async fn create_view<H: Host>(&self, host: &H, select: &str) -> MigrateResult<()> {
        self.table_name()?;
        let sql = self.view_sql(select);
        host.execute(&sql).await?;
        info!("{}: view replaced", self.name);
        Ok(())
    }
}
