//! MySQL host backed by sqlx.
//!
//! Table handles introspect the current database through
//! `information_schema` and commit queued actions as rendered DDL. In dry-run
//! mode statements are logged instead of executed; introspection still reads
//! the live database.

use std::collections::BTreeMap;

use sqlx::Executor;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::{debug, info};

use crate::config::MigrateConfig;
use crate::ddl;
use crate::error::{MigrateError, MigrateResult};
use crate::host::{Host, TableHandle};
use crate::limits::SizeLimits;
use crate::options::TableSettings;
use crate::schema::{ColumnInfo, ColumnSpec, IndexSpec, TableAction, same_columns};

const HAS_COLUMN_SQL: &str = "SELECT COUNT(*) FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?";

const COLUMNS_SQL: &str = "SELECT CAST(COLUMN_NAME AS CHAR), CAST(COLUMN_TYPE AS CHAR), \
     CAST(IS_NULLABLE AS CHAR) FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION";

const INDEXES_SQL: &str = "SELECT CAST(INDEX_NAME AS CHAR), CAST(COLUMN_NAME AS CHAR) \
     FROM information_schema.STATISTICS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? ORDER BY INDEX_NAME, SEQ_IN_INDEX";

/// Execute `sql`, or only log it when `dry_run` is set. A failed statement
/// is an `Execution` error; introspection failures stay `Database`.
async fn run(pool: &MySqlPool, dry_run: bool, sql: &str) -> MigrateResult<u64> {
    if dry_run {
        info!("dry-run: {}", sql);
        return Ok(0);
    }

    debug!("executing: {}", sql);
    let result = pool
        .execute(sql)
        .await
        .map_err(|e| MigrateError::Execution(e.to_string()))?;
    Ok(result.rows_affected())
}

/// Group `STATISTICS` rows (index name, column name) into per-index column
/// lists, keeping `SEQ_IN_INDEX` order.
fn group_indexes(rows: Vec<(String, Option<String>)>) -> BTreeMap<String, Vec<String>> {
    let mut indexes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (index, column) in rows {
        // Functional index parts have no column name.
        if let Some(column) = column {
            indexes.entry(index).or_default().push(column);
        }
    }
    indexes
}

/// A MySQL connection pool acting as the migration host.
#[derive(Clone)]
pub struct SqlxHost {
    pool: MySqlPool,
    dry_run: bool,
    limits: SizeLimits,
    defaults: TableSettings,
}

impl SqlxHost {
    /// Connect using `config`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = MigrateConfig::load("migrate.toml")?;
    /// let host = SqlxHost::connect(&config).await?;
    /// ```
    pub async fn connect(config: &MigrateConfig) -> MigrateResult<Self> {
        config.validate()?;

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        info!(
            "connected ({} max connections, dry_run={})",
            config.max_connections, config.dry_run
        );
        Ok(Self::from_pool(pool)
            .dry_run(config.dry_run)
            .table_defaults(config.table.clone()))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self {
            pool,
            dry_run: false,
            limits: SizeLimits::MYSQL,
            defaults: TableSettings::default(),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Encoding/collation used when a migration does not set its own.
    pub fn table_defaults(mut self, defaults: TableSettings) -> Self {
        self.defaults = defaults;
        self
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    fn merged_settings(&self, settings: Option<&TableSettings>) -> TableSettings {
        match settings {
            Some(s) => TableSettings {
                id: s.id,
                primary_key: s.primary_key.clone(),
                collation: s.collation.clone().or_else(|| self.defaults.collation.clone()),
                encoding: s.encoding.clone().or_else(|| self.defaults.encoding.clone()),
            },
            None => self.defaults.clone(),
        }
    }
}

impl Host for SqlxHost {
    type Table = SqlTable;

    fn table(&self, name: &str, settings: Option<&TableSettings>) -> Self::Table {
        SqlTable {
            pool: self.pool.clone(),
            name: name.to_string(),
            settings: self.merged_settings(settings),
            pending: Vec::new(),
            dry_run: self.dry_run,
            limits: self.limits,
        }
    }

    async fn execute(&self, sql: &str) -> MigrateResult<u64> {
        run(&self.pool, self.dry_run, sql).await
    }

    fn size_limits(&self) -> SizeLimits {
        self.limits
    }
}

/// Table handle on a [`SqlxHost`].
pub struct SqlTable {
    pool: MySqlPool,
    name: String,
    settings: TableSettings,
    pending: Vec<TableAction>,
    dry_run: bool,
    limits: SizeLimits,
}

impl SqlTable {
    /// Statement `create()` would run for the queued actions.
    pub fn create_sql(&self) -> String {
        ddl::create_table_sql(&self.name, &self.settings, &self.pending, &self.limits)
    }

    /// Statement `update()` would run, if anything is queued.
    pub fn update_sql(&self) -> Option<String> {
        ddl::alter_table_sql(&self.name, &self.pending, &self.limits)
    }
}

impl TableHandle for SqlTable {
    fn add_column(&mut self, column: &ColumnSpec) {
        self.pending.push(TableAction::AddColumn(column.clone()));
    }

    fn change_column(&mut self, column: &ColumnSpec) {
        self.pending.push(TableAction::ChangeColumn(column.clone()));
    }

    fn remove_column(&mut self, name: &str) {
        self.pending.push(TableAction::RemoveColumn(name.to_string()));
    }

    fn add_index(&mut self, index: &IndexSpec) {
        self.pending.push(TableAction::AddIndex(index.clone()));
    }

    async fn has_column(&self, name: &str) -> MigrateResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(HAS_COLUMN_SQL)
            .bind(&self.name)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn columns(&self) -> MigrateResult<Vec<ColumnInfo>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(COLUMNS_SQL)
            .bind(&self.name)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(name, column_type, nullable)| ColumnInfo {
                name,
                column_type,
                nullable: nullable.eq_ignore_ascii_case("YES"),
            })
            .collect())
    }

    async fn has_index(&self, columns: &[String]) -> MigrateResult<bool> {
        let rows: Vec<(String, Option<String>)> = sqlx::query_as(INDEXES_SQL)
            .bind(&self.name)
            .fetch_all(&self.pool)
            .await?;

        Ok(group_indexes(rows)
            .values()
            .any(|cols| same_columns(cols, columns)))
    }

    async fn create(&mut self) -> MigrateResult<()> {
        let sql = self.create_sql();
        run(&self.pool, self.dry_run, &sql).await?;
        self.pending.clear();
        info!("created table {}", self.name);
        Ok(())
    }

    async fn update(&mut self) -> MigrateResult<()> {
        if let Some(sql) = self.update_sql() {
            run(&self.pool, self.dry_run, &sql).await?;
        }
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::options::ColumnOptions;
    use crate::types::ColumnType;
    use pretty_assertions::assert_eq;

    fn lazy_host() -> SqlxHost {
        let pool = MySqlPoolOptions::new()
            .connect_lazy("mysql://root@localhost/migrate_test")
            .unwrap();
        SqlxHost::from_pool(pool).dry_run(true)
    }

    #[tokio::test]
    async fn test_dry_run_never_touches_database() {
        let host = lazy_host();
        assert_eq!(host.execute("CREATE OR REPLACE VIEW v AS SELECT 1").await.unwrap(), 0);

        let mut table = host.table("t", Some(&TableSettings::new()));
        table.add_column(&ColumnSpec::new("a", ColumnType::String, ColumnOptions::new()));
        table.create().await.unwrap();
        assert!(table.update_sql().is_none());
    }

    #[tokio::test]
    async fn test_settings_merge_with_defaults() {
        let host = lazy_host().table_defaults(
            TableSettings::new()
                .encoding("utf8mb4")
                .collation("utf8mb4_unicode_ci"),
        );
        let table = host.table("t", Some(&TableSettings::new().collation("utf8mb4_bin")));
        assert_eq!(table.settings.encoding.as_deref(), Some("utf8mb4"));
        assert_eq!(table.settings.collation.as_deref(), Some("utf8mb4_bin"));
    }

    #[tokio::test]
    async fn test_queued_actions_render() {
        let host = lazy_host();
        let mut table = host.table("t", None);
        table.remove_column("legacy");
        assert_eq!(
            table.update_sql().as_deref(),
            Some("ALTER TABLE `t` DROP COLUMN `legacy`")
        );
    }

    #[test]
    fn test_group_indexes() {
        let rows = vec![
            ("PRIMARY".to_string(), Some("id".to_string())),
            ("idx_name".to_string(), Some("last".to_string())),
            ("idx_name".to_string(), Some("first".to_string())),
            ("idx_expr".to_string(), None),
            ("idx_mixed".to_string(), Some("email".to_string())),
            ("idx_mixed".to_string(), None),
        ];

        let grouped = group_indexes(rows);
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped["PRIMARY"], vec!["id"]);
        assert_eq!(grouped["idx_name"], vec!["last", "first"]);
        assert_eq!(grouped["idx_mixed"], vec!["email"]);
        assert!(!grouped.contains_key("idx_expr"));
    }

    #[tokio::test]
    async fn test_driver_errors_are_classified() {
        let pool = MySqlPoolOptions::new()
            .acquire_timeout(Duration::from_millis(300))
            .connect_lazy("mysql://root@127.0.0.1:1/migrate_test")
            .unwrap();
        let host = SqlxHost::from_pool(pool);

        let err = host.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(err, MigrateError::Execution(_)), "{err:?}");

        let table = host.table("t", None);
        let err = table.has_column("a").await.unwrap_err();
        assert!(matches!(err, MigrateError::Database(_)), "{err:?}");
    }
}
